use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "retail_dataset.log";
const DEFAULT_FILTER: &str = "retail_dataset=info,warn";

/// Human-readable lines on stdout plus JSON lines in `log_dir`, rotated daily.
///
/// The file writer flushes on a background thread for as long as the
/// returned guard is alive. A subscriber that is already installed is kept.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("cannot create log directory {}: {}", log_dir.display(), e);
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
        .try_init();

    guard
}
