use crate::Year;
use thiserror::Error;

/// Error type for invalid panels, identities and decompositions.
///
/// Every variant that can be tied to a location names the offending
/// sector, year and variable so the input can be fixed at the source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KayaError {
    #[error("Invalid {variable} in sector '{sector}', year {year}: {reason}")]
    DataValidation {
        sector: String,
        year: Year,
        variable: String,
        reason: String,
    },
    #[error("Driver product {product} does not reconstruct emissions {emissions} in sector '{sector}', year {year}")]
    IdentityMismatch {
        sector: String,
        year: Year,
        emissions: f64,
        product: f64,
    },
    #[error("Variable '{0}' is not present in the panel")]
    MissingVariable(String),
    #[error("Duplicate observation of '{variable}' in sector '{sector}', year {year}")]
    DuplicateObservation {
        sector: String,
        year: Year,
        variable: String,
    },
    #[error("Years must be contiguous, found a gap between {previous} and {next}")]
    NonContiguousYears { previous: Year, next: Year },
    #[error("Invalid year range {start}-{end}: {reason}")]
    InvalidYearRange {
        start: Year,
        end: Year,
        reason: String,
    },
    #[error("Panel contains no observations")]
    EmptyPanel,
    #[error("Driver identity must contain at least one driver")]
    EmptyIdentity,
    #[error("Driver '{0}' is defined more than once")]
    DuplicateDriver(String),
    #[error("Contributions in sector '{sector}' for {year} sum to {explained}, expected emissions change {delta}")]
    AdditivityViolation {
        sector: String,
        year: Year,
        delta: f64,
        explained: f64,
    },
    #[error("Aggregate emissions in {year} are {value}; multiplicative decomposition needs positive totals")]
    NonPositiveAggregate { year: Year, value: f64 },
}

/// Convenience type for `Result<T, KayaError>`.
pub type KayaResult<T> = Result<T, KayaError>;
