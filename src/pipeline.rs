use crate::archive;
use crate::config::DatasetConfig;
use crate::customers::{self, UkIdentityGenerator};
use crate::error::Result;
use crate::fetcher::{self, FetchReceipt, SourceFetcher};
use crate::manifest::{ArtifactMeta, RunManifest, SourceMeta};
use crate::metrics;
use crate::output;
use crate::transform::{self, TransformStats};
use crate::workbook;
use chrono::{Local, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub source_sha256: String,
    pub stats: TransformStats,
    pub customers: Option<usize>,
    pub artifacts: Vec<PathBuf>,
    pub compressed: Vec<PathBuf>,
}

/// Cleanup → fetch → transform → synthesize → compress, strictly in that order.
pub struct Pipeline {
    config: DatasetConfig,
    fetcher: Box<dyn SourceFetcher>,
}

impl Pipeline {
    pub fn new(config: DatasetConfig, fetcher: Box<dyn SourceFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub async fn run(&self) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("dataset_run", run_id = %run_id);
        self.run_stages(run_id).instrument(span).await
    }

    async fn run_stages(&self, run_id: Uuid) -> Result<PipelineResult> {
        self.config.validate()?;
        if self.config.metrics_snapshot.is_some() {
            metrics::init_metrics();
        }
        let started_at = Utc::now();
        let paths = self.config.artifacts();
        info!("🚀 Starting dataset run into {}", self.config.output_dir.display());

        // Step 1: Clear the previous run's artifacts
        archive::clean_outputs(&paths);

        // Step 2: Fetch the source workbook
        let t_stage = Instant::now();
        let receipt: FetchReceipt =
            fetcher::fetch_to_file(&*self.fetcher, &self.config.source_url, &paths.workbook)
                .await?;
        metrics::record_fetch(receipt.bytes);
        metrics::record_stage_duration("fetch", t_stage.elapsed().as_secs_f64());

        // Step 3: Clean, duplicate per region and sort
        let t_stage = Instant::now();
        let rows = workbook::load_source_rows(&paths.workbook, &self.config.sheet_name)?;
        let transformed = transform::transform(rows)?;
        output::write_transactions_csv(&paths.transactions_csv, &transformed.transactions)?;
        output::write_transactions_json(&paths.transactions_json, &transformed.transactions)?;
        metrics::record_transform(&transformed.stats);
        metrics::record_stage_duration("transform", t_stage.elapsed().as_secs_f64());

        let mut artifacts = vec![
            paths.workbook.clone(),
            paths.transactions_csv.clone(),
            paths.transactions_json.clone(),
        ];

        // Step 4: Fictitious customers for every id in the transaction output
        let customers = if self.config.customers.enabled {
            let t_stage = Instant::now();
            let ids = customers::distinct_customer_ids(&paths.transactions_csv)?;
            let mut generator = UkIdentityGenerator::new(self.config.customers.seed);
            let records =
                customers::synthesize_customers(&ids, &mut generator, Local::now().naive_local());
            customers::write_customers_csv(&paths.customers_csv, &records)?;
            metrics::record_customers(records.len());
            metrics::record_stage_duration("customers", t_stage.elapsed().as_secs_f64());
            artifacts.push(paths.customers_csv.clone());
            Some(records.len())
        } else {
            info!("Customer synthesis disabled");
            None
        };

        // Step 5: Compressed copies alongside the originals
        let compressed = if self.config.compress {
            let t_stage = Instant::now();
            let compressed = archive::compress_artifacts(&artifacts)?;
            metrics::record_compressed(compressed.len());
            metrics::record_stage_duration("compress", t_stage.elapsed().as_secs_f64());
            compressed
        } else {
            Vec::new()
        };

        if let Some(path) = &self.config.manifest {
            let mut described = Vec::with_capacity(artifacts.len() + compressed.len());
            for artifact in artifacts.iter().chain(compressed.iter()) {
                described.push(ArtifactMeta::describe(artifact)?);
            }
            let manifest = RunManifest {
                run_id,
                started_at,
                finished_at: Utc::now(),
                source: SourceMeta {
                    url: self.config.source_url.clone(),
                    sheet: self.config.sheet_name.clone(),
                    size_bytes: receipt.bytes,
                    sha256: receipt.sha256.clone(),
                },
                transform: transformed.stats.clone(),
                customers,
                artifacts: described,
            };
            manifest.write(path)?;
            info!("📝 Wrote run manifest to {}", path.display());
        }

        if let Some(path) = &self.config.metrics_snapshot {
            metrics::write_snapshot(path)?;
        }

        info!(
            transactions = transformed.stats.emitted,
            customers = customers.unwrap_or(0),
            "✅ Dataset run finished"
        );
        Ok(PipelineResult {
            run_id,
            source_sha256: receipt.sha256,
            stats: transformed.stats,
            customers,
            artifacts,
            compressed,
        })
    }
}
