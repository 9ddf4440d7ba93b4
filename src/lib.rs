pub mod archive;
pub mod config;
pub mod constants;
pub mod customers;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod manifest;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod transform;
pub mod types;
pub mod workbook;

pub use config::DatasetConfig;
pub use error::{DatasetError, Result};
pub use pipeline::{Pipeline, PipelineResult};
