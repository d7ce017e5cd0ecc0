/// Result type used across the dashboard core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the store, cursor, loader and configuration layers.
///
/// Empty slices of data are *not* errors: a day with no readings or a range
/// filter that excludes everything is reported through `Option`/zero values
/// by the stats functions. Only constructing a store from nothing, or asking
/// an empty cursor for its day, fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot build a store from an empty set of readings")]
    EmptyInput,

    #[error("no days available to select")]
    EmptyState,

    #[error("row {row}, column '{column}': cannot parse {value:?}: {reason}")]
    Parse {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("invalid thresholds: low={low}, high={high}")]
    InvalidThresholds { low: f64, high: f64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
