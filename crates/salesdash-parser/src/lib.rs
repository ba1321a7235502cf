//! Transaction file loader
//!
//! Reads `|`-delimited CSV uploads into typed rows, deriving the
//! `transaction_month` and `transaction_year` fields from `transaction_date`.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod parser;
pub mod types;

pub use error::ParseError;
pub use parser::{parse_amount, parse_date, ParserOptions, PipeCsvParser};
pub use types::{ParsedTable, TransactionRow, REQUIRED_COLUMNS};

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn TransactionParser>;

/// Trait for upload parsers
#[async_trait]
pub trait TransactionParser: Send + Sync {
    /// Parse the raw bytes of an uploaded file
    async fn parse(&self, content: &[u8]) -> Result<ParsedTable, ParseError>;
}

#[async_trait]
impl TransactionParser for PipeCsvParser {
    async fn parse(&self, content: &[u8]) -> Result<ParsedTable, ParseError> {
        self.parse_bytes(content)
    }
}
