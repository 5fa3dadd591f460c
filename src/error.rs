use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop the dataset from loading. Any of these is fatal
/// at startup: the dashboard has nothing to show without its table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook read error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook contains no sheets")]
    EmptyWorkbook,

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("row {row}: cannot parse InvoiceDate {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: cannot parse {column} {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("cannot format non-finite amount {0}")]
    NonFinite(f64),
}
