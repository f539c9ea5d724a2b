//! ## Errors
//!
//! [`DashboardError`] is the one error type of the crate. Library failures (I/O, DataFusion,
//! Arrow, Parquet) convert into it with `?`; the remaining variants name the ways a bookings
//! file or a configuration value can be wrong. The server shows any of them as an error page.
//!
//! ```rust
//! use ride_insights::exceptions::{DashboardError, DashboardResult};
//!
//! fn open_bookings() -> DashboardResult<()> {
//!     Err(DashboardError::DataFileNotFound("uber_bookings.csv".into()))
//! }
//! assert!(open_bookings().is_err());
//! ```

use thiserror::Error;

/// Errors raised while loading, aggregating or rendering the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Planning or execution failure inside the query engine.
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] datafusion::error::DataFusionError),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// The dataset file does not exist at the configured path.
    #[error("Data file not found: {0}")]
    DataFileNotFound(String),

    /// The data path has an extension other than `.csv` or `.parquet`.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A column the dashboard reads is absent (header names are matched exactly).
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A setting or argument is out of range or cannot be parsed.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A query result did not have the shape the dashboard expected.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
