use crate::constants;
use crate::error::{DatasetError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration. Every field has a default, so a run without a
/// configuration file produces the standard artifact set in the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub source_url: String,
    pub sheet_name: String,
    pub output_dir: PathBuf,
    pub files: FileNames,
    pub fetch: FetchConfig,
    pub customers: CustomersConfig,
    pub compress: bool,
    pub metrics_snapshot: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub workbook: String,
    pub transactions_csv: String,
    pub transactions_json: String,
    pub customers_csv: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustomersConfig {
    pub enabled: bool,
    pub seed: Option<u64>,
}

/// Resolved locations of the four artifacts a run owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub workbook: PathBuf,
    pub transactions_csv: PathBuf,
    pub transactions_json: PathBuf,
    pub customers_csv: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path, names: &FileNames) -> Self {
        Self {
            workbook: dir.join(&names.workbook),
            transactions_csv: dir.join(&names.transactions_csv),
            transactions_json: dir.join(&names.transactions_json),
            customers_csv: dir.join(&names.customers_csv),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            &self.workbook,
            &self.transactions_csv,
            &self.transactions_json,
            &self.customers_csv,
        ]
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source_url: constants::SOURCE_URL.to_string(),
            sheet_name: constants::SOURCE_SHEET.to_string(),
            output_dir: PathBuf::from("."),
            files: FileNames::default(),
            fetch: FetchConfig::default(),
            customers: CustomersConfig::default(),
            compress: true,
            metrics_snapshot: None,
            manifest: None,
        }
    }
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            workbook: constants::WORKBOOK_FILE.to_string(),
            transactions_csv: constants::TRANSACTIONS_CSV_FILE.to_string(),
            transactions_json: constants::TRANSACTIONS_JSON_FILE.to_string(),
            customers_csv: constants::CUSTOMERS_CSV_FILE.to_string(),
        }
    }
}

impl Default for CustomersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
        }
    }
}

impl DatasetConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            DatasetError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: DatasetConfig = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, or fall back to built-in defaults when none is given.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn artifacts(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.output_dir, &self.files)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(DatasetError::Config("source_url must not be empty".into()));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(DatasetError::Config("sheet_name must not be empty".into()));
        }
        let artifacts = self.artifacts();
        let mut seen = HashSet::new();
        for path in artifacts.all() {
            if path.file_name().is_none() {
                return Err(DatasetError::Config(format!(
                    "artifact path '{}' has no file name",
                    path.display()
                )));
            }
            if !seen.insert(path) {
                return Err(DatasetError::Config(format!(
                    "artifact path '{}' is used more than once",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_standard_artifacts() {
        let config = DatasetConfig::default();
        let paths = config.artifacts();
        assert_eq!(paths.workbook, Path::new(".").join("OnlineRetail.xlsx"));
        assert_eq!(paths.customers_csv, Path::new(".").join("OnlineRetailCustomers.csv"));
        assert!(config.customers.enabled);
        assert!(config.compress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "output_dir = \"out\"\n\n[customers]\nseed = 7\n\n[files]\ntransactions_csv = \"tx.csv\""
        )
        .unwrap();

        let config = DatasetConfig::load(file.path()).unwrap();
        assert_eq!(config.customers.seed, Some(7));
        assert!(config.customers.enabled);
        assert_eq!(config.sheet_name, constants::SOURCE_SHEET);
        assert_eq!(config.artifacts().transactions_csv, Path::new("out").join("tx.csv"));
        assert_eq!(config.artifacts().transactions_json, Path::new("out").join("OnlineRetail.json"));
    }

    #[test]
    fn example_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("dataset.example.toml");
        let config = DatasetConfig::load(&path).unwrap();
        assert_eq!(config.artifacts(), DatasetConfig::default().artifacts());
        assert_eq!(config.fetch.timeout_secs, None);
    }

    #[test]
    fn duplicate_artifact_paths_are_rejected() {
        let mut config = DatasetConfig::default();
        config.files.transactions_json = config.files.transactions_csv.clone();
        assert!(matches!(config.validate(), Err(DatasetError::Config(_))));
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let err = DatasetConfig::load(Path::new("/nonexistent/dataset.toml")).unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }
}
