pub mod batch;
pub mod schedule;
pub mod single;

use crate::config::ConfigError;
use crate::parse::ParseError;
use crate::store::StoreError;

pub use batch::{import_csv, BatchResult};
pub use single::{
    calculate_and_record, list_calculations, Allowance, AllowanceType, TaxRequest, TaxResponse,
};

#[derive(Debug, thiserror::Error)]
pub enum TaxError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("import row {row}: {source}")]
    Parse {
        row: usize,
        #[source]
        source: ParseError,
    },
    #[error("import row {row}: amounts out of range")]
    OutOfRange { row: usize },
    #[error("tax configuration has not been set, run `config set` first")]
    ConfigurationUnavailable,
    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
}
