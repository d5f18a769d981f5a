//! Column schema of the long-format input table.

use crate::errors::{IoError, IoResult};
use serde::{Deserialize, Serialize};

/// Names of the four columns of a long-format panel file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSchema {
    pub sector_column: String,
    pub year_column: String,
    pub variable_column: String,
    pub value_column: String,

    /// Field delimiter
    ///
    /// Default: ','
    pub delimiter: char,
}

impl Default for PanelSchema {
    fn default() -> Self {
        Self {
            sector_column: "sector".to_string(),
            year_column: "year".to_string(),
            variable_column: "variable".to_string(),
            value_column: "value".to_string(),
            delimiter: ',',
        }
    }
}

impl PanelSchema {
    pub fn delimiter_byte(&self) -> IoResult<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(IoError::InvalidDelimiter(self.delimiter))
        }
    }

    /// Column names in sector, year, variable, value order
    pub fn columns(&self) -> [&str; 4] {
        [
            &self.sector_column,
            &self.year_column,
            &self.variable_column,
            &self.value_column,
        ]
    }
}
