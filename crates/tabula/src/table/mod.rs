//! # Tables
//!
//! Delimited-text parsing into a column-oriented [`DataFrame`], with row
//! slicing and summary statistics.

mod describe;
mod frame;
mod reader;
mod value;

pub use describe::Describe;
pub use frame::{Column, DataFrame};
pub use reader::{NA_VALUES, ReadOptions, read_csv, read_csv_from};
pub use value::{DType, Value};

/// Errors raised while parsing or summarising a table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("No columns to parse from file")]
    EmptyData,

    #[error("{0}")]
    Malformed(String),

    #[error("Invalid read option: {0}")]
    InvalidOption(String),

    #[error("Cannot describe a DataFrame without columns")]
    NoColumns,

    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
