use kaya_core::KayaError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for reading panels and writing result tables.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Required column '{column}' is missing, found columns: {found}")]
    MissingColumn { column: String, found: String },
    #[error("Line {line}: could not parse {column} value '{value}' ({context})")]
    Parse {
        line: u64,
        column: String,
        value: String,
        context: String,
    },
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
    #[error(transparent)]
    Kaya(#[from] KayaError),
}

/// Convenience type for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
