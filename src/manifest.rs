use crate::error::Result;
use crate::fetcher::sha256_hex;
use crate::transform::TransformStats;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Serialize, Clone)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

impl ArtifactMeta {
    pub fn describe(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: bytes.len() as u64,
            sha256: sha256_hex(&bytes),
        })
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct SourceMeta {
    pub url: String,
    pub sheet: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Summary of one run, written next to the artifacts when configured.
#[derive(Debug, Serialize, Clone)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source: SourceMeta,
    pub transform: TransformStats,
    pub customers: Option<usize>,
    pub artifacts: Vec<ArtifactMeta>,
}

impl RunManifest {
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
