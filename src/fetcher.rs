use crate::error::{DatasetError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Retrieves the raw bytes of a remote resource.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl SourceFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DatasetError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// What a completed download left on disk
#[derive(Debug, Clone)]
pub struct FetchReceipt {
    pub bytes: u64,
    pub sha256: String,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Download `url` and write it verbatim to `dest`, replacing any existing file.
#[instrument(skip(fetcher))]
pub async fn fetch_to_file(
    fetcher: &dyn SourceFetcher,
    url: &str,
    dest: &Path,
) -> Result<FetchReceipt> {
    info!("📡 Downloading source workbook");
    let t_fetch = std::time::Instant::now();
    let bytes = fetcher.fetch(url).await?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, &bytes)?;

    let receipt = FetchReceipt {
        bytes: bytes.len() as u64,
        sha256: sha256_hex(&bytes),
    };
    info!(
        bytes = receipt.bytes,
        sha256 = %receipt.sha256,
        elapsed_secs = t_fetch.elapsed().as_secs_f64(),
        "✅ Saved source workbook to {}",
        dest.display()
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticFetcher(Vec<u8>);

    #[async_trait]
    impl SourceFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl SourceFetcher for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(DatasetError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    #[tokio::test]
    async fn overwrites_existing_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("OnlineRetail.xlsx");
        fs::write(&dest, b"stale contents that are longer").unwrap();

        let fetcher = StaticFetcher(b"PK\x03\x04fresh".to_vec());
        let receipt = fetch_to_file(&fetcher, "http://example.invalid/x.xlsx", &dest)
            .await
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"PK\x03\x04fresh");
        assert_eq!(receipt.bytes, 9);
        assert_eq!(receipt.sha256, sha256_hex(b"PK\x03\x04fresh"));
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("OnlineRetail.xlsx");
        let err = fetch_to_file(&FailingFetcher, "http://example.invalid/x.xlsx", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::HttpStatus { status: 404, .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
