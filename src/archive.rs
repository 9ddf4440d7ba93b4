use crate::config::ArtifactPaths;
use crate::constants::COMPRESSED_SUFFIX;
use crate::error::{DatasetError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `<path>.gz`, keeping the original extension.
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// Best-effort delete. Returns true when a file was removed.
pub fn remove_file(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Could not remove {}: {}", path.display(), e);
            false
        }
    }
}

/// Remove every artifact of a previous run, compressed copies included.
pub fn clean_outputs(paths: &ArtifactPaths) -> usize {
    let originals = paths.all();
    let removed = originals
        .iter()
        .map(|p| p.to_path_buf())
        .chain(originals.iter().map(|p| compressed_path(p)))
        .filter(|p| remove_file(p))
        .count();
    info!("🧹 Removed {} stale artifacts", removed);
    removed
}

/// Gzip `path` into `<path>.gz`, leaving the original in place.
pub fn compress_file(path: &Path) -> Result<PathBuf> {
    let target = compressed_path(path);
    let wrap = |source: io::Error| DatasetError::Compression {
        path: path.to_path_buf(),
        source,
    };

    let mut input = BufReader::new(File::open(path).map_err(wrap)?);
    let output = BufWriter::new(File::create(&target).map_err(wrap)?);
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder).map_err(wrap)?;
    encoder.finish().map_err(wrap)?.flush().map_err(wrap)?;

    debug!("Compressed {} -> {}", path.display(), target.display());
    Ok(target)
}

/// Compress each produced artifact; any failure aborts the run.
pub fn compress_artifacts(produced: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut compressed = Vec::with_capacity(produced.len());
    for path in produced {
        compressed.push(compress_file(path)?);
    }
    info!("🗜️ Compressed {} artifacts", compressed.len());
    Ok(compressed)
}
