use anyhow::Context;
use clap::Parser;
use retail_dataset::fetcher::ReqwestFetcher;
use retail_dataset::{logging, DatasetConfig, Pipeline};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "retail_dataset")]
#[command(about = "Builds the UK/US online retail demo dataset")]
#[command(version = "0.1.0")]
struct Cli {
    /// Optional TOML configuration; defaults reproduce the standard artifact set
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init_logging(Path::new("logs"));

    let config = DatasetConfig::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;
    let fetcher = ReqwestFetcher::new(config.fetch.timeout_secs.map(Duration::from_secs))
        .context("building HTTP client")?;

    let pipeline = Pipeline::new(config, Box::new(fetcher));
    match pipeline.run().await {
        Ok(result) => {
            info!("Pipeline finished");
            println!("\n📊 Dataset run {}:", result.run_id);
            println!("   Rows loaded: {}", result.stats.loaded);
            println!(
                "   Dropped: {} bad invoice, {} no customer, {} non-positive quantity",
                result.stats.dropped_invoice,
                result.stats.dropped_customer,
                result.stats.dropped_quantity
            );
            println!("   Transactions: {}", result.stats.emitted);
            if let Some(customers) = result.customers {
                println!("   Customers: {}", customers);
            }
            for artifact in result.artifacts.iter().chain(result.compressed.iter()) {
                println!("   Output file: {}", artifact.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(e).context("dataset run failed")
        }
    }
}
