use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A `<table>` fragment that could not be read as rows of cells.
    #[error("table {index}: {reason}")]
    UnparseableTable { index: usize, reason: String },

    #[error("pattern for '{field}' is invalid: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
