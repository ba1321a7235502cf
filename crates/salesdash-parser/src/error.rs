//! Error types for salesdash-parser

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("The uploaded file is empty")]
    EmptyInput,

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Unparseable date '{value}' on line {line}")]
    InvalidDate { line: u64, value: String },

    #[error("Non-numeric value '{value}' in column {column} on line {line}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}
