//! Storage collaborators for configuration and calculation history.

use crate::config::Configuration;
use crate::tax::single::TaxCalculation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no configuration row to update")]
    MissingConfig,
}

/// Source of the current deduction parameters.
pub trait ConfigProvider {
    /// `None` when no configuration has been stored yet.
    fn get_config(&self) -> Result<Option<Configuration>, StoreError>;
    fn insert_config(&mut self, config: &Configuration) -> Result<(), StoreError>;
    fn update_config(&mut self, config: &Configuration) -> Result<(), StoreError>;
}

/// Destination for single-path calculation records.
pub trait CalculationSink {
    /// Returns the id assigned to the saved record.
    fn save_calculation(&mut self, calculation: &TaxCalculation) -> Result<u64, StoreError>;
    fn list_calculations(&self) -> Result<Vec<StoredCalculation>, StoreError>;
}

/// A persisted calculation with store-assigned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCalculation {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub calculation: TaxCalculation,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    config: Option<Configuration>,
    #[serde(default)]
    calculations: Vec<StoredCalculation>,
}

/// Single JSON document holding the configuration row and all history.
///
/// Every write rewrites the whole document into a temporary file next to the
/// store, which is then renamed over it.
#[derive(Debug)]
pub struct JsonStore {
    path: Option<PathBuf>,
    data: StoreData,
}

impl JsonStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            log::debug!("Store {} not found, starting empty", path.display());
            StoreData::default()
        };
        Ok(JsonStore {
            path: Some(path),
            data,
        })
    }

    /// Store that never touches the filesystem.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        JsonStore {
            path: None,
            data: StoreData::default(),
        }
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let mut file = tempfile::NamedTempFile::new_in(dir)?;
            {
                let mut writer = BufWriter::new(file.as_file_mut());
                serde_json::to_writer_pretty(&mut writer, &self.data)?;
                writer.flush()?;
            }
            file.persist(path).map_err(|err| err.error)?;
            log::debug!("Wrote store {}", path.display());
        }
        Ok(())
    }
}

impl ConfigProvider for JsonStore {
    fn get_config(&self) -> Result<Option<Configuration>, StoreError> {
        Ok(self.data.config)
    }

    fn insert_config(&mut self, config: &Configuration) -> Result<(), StoreError> {
        self.data.config = Some(*config);
        self.flush()
    }

    fn update_config(&mut self, config: &Configuration) -> Result<(), StoreError> {
        match self.data.config.as_mut() {
            Some(current) => *current = *config,
            None => return Err(StoreError::MissingConfig),
        }
        self.flush()
    }
}

impl CalculationSink for JsonStore {
    fn save_calculation(&mut self, calculation: &TaxCalculation) -> Result<u64, StoreError> {
        let id = self
            .data
            .calculations
            .last()
            .map_or(1, |last| last.id + 1);
        self.data.calculations.push(StoredCalculation {
            id,
            created_at: Utc::now(),
            calculation: calculation.clone(),
        });
        self.flush()?;
        Ok(id)
    }

    fn list_calculations(&self) -> Result<Vec<StoredCalculation>, StoreError> {
        Ok(self.data.calculations.clone())
    }
}
