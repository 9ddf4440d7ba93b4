use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Workbook could not be read: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Worksheet '{sheet}' is missing column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Malformed cell at row {row}, column {column}: {reason}")]
    MalformedCell {
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("Invoice number {invoice_no} overflows when tagged with region digit {digit}")]
    InvoiceOverflow { invoice_no: i64, digit: i64 },

    #[error("Customer synthesis input error: {0}")]
    SynthesisInput(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to compress {path}: {source}")]
    Compression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
