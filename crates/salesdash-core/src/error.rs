//! Error types for salesdash-core
//!
//! Every failure the dashboard can surface carries a machine-readable code,
//! a severity and a list of suggestions for the user.

use salesdash_parser::{ParseError, REQUIRED_COLUMNS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Password gate not passed
    Unauthorized,
    /// No dataset uploaded yet
    NotLoaded,
    /// Upload contained no data
    EmptyUpload,
    /// Required column absent
    MissingColumn,
    /// Date value not parseable
    InvalidDate,
    /// Numeric value not parseable
    InvalidNumber,
    /// CSV structure broken
    MalformedCsv,
    /// Upload larger than the configured limit
    UploadTooLarge,
    /// Upload request malformed
    InvalidUpload,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::EmptyUpload => write!(f, "EMPTY_UPLOAD"),
            ErrorCode::MissingColumn => write!(f, "MISSING_COLUMN"),
            ErrorCode::InvalidDate => write!(f, "INVALID_DATE"),
            ErrorCode::InvalidNumber => write!(f, "INVALID_NUMBER"),
            ErrorCode::MalformedCsv => write!(f, "MALFORMED_CSV"),
            ErrorCode::UploadTooLarge => write!(f, "UPLOAD_TOO_LARGE"),
            ErrorCode::InvalidUpload => write!(f, "INVALID_UPLOAD"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

impl ErrorCode {
    /// Severity reported alongside this code
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::NotLoaded => ErrorSeverity::Info,
            ErrorCode::Unauthorized
            | ErrorCode::EmptyUpload
            | ErrorCode::UploadTooLarge
            | ErrorCode::InvalidUpload => ErrorSeverity::Warning,
            ErrorCode::MissingColumn
            | ErrorCode::InvalidDate
            | ErrorCode::InvalidNumber
            | ErrorCode::MalformedCsv => ErrorSeverity::Error,
            ErrorCode::InternalError => ErrorSeverity::Critical,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - the request was refused but nothing is broken
    Warning,
    /// Error - the operation failed
    #[default]
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Detailed error information for pages and API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    #[serde(default)]
    pub severity: ErrorSeverity,
    /// Human-readable message
    pub message: String,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            severity: code.severity(),
            message,
            suggestions: vec![],
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for salesdash-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Incorrect password! Access denied.")]
    Unauthorized,

    #[error("No file has been uploaded")]
    NotLoaded,

    #[error("The uploaded file is empty")]
    EmptyUpload,

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

    #[error("Malformed CSV: {message}")]
    MalformedCsv { message: String },

    #[error("Upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },
}

impl From<ParseError> for CoreError {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::EmptyInput => CoreError::EmptyUpload,
            ParseError::MissingColumn { column } => CoreError::MissingColumn { column },
            ParseError::InvalidDate { line, value } => CoreError::InvalidDate { line, value },
            ParseError::InvalidNumber { line, column, value } => {
                CoreError::InvalidNumber { line, column, value }
            }
            ParseError::Csv(e) => CoreError::MalformedCsv { message: e.to_string() },
        }
    }
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::EmptyUpload => ErrorCode::EmptyUpload,
            CoreError::MissingColumn { .. } => ErrorCode::MissingColumn,
            CoreError::InvalidDate { .. } => ErrorCode::InvalidDate,
            CoreError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            CoreError::MalformedCsv { .. } => ErrorCode::MalformedCsv,
            CoreError::UploadTooLarge { .. } => ErrorCode::UploadTooLarge,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Unauthorized => {
                details = details.with_suggestion("Enter the dashboard password in the sidebar.".to_string());
            }
            CoreError::NotLoaded => {
                details = details.with_suggestion("Upload a CSV file first.".to_string());
            }
            CoreError::EmptyUpload | CoreError::MissingColumn { .. } | CoreError::MalformedCsv { .. } => {
                details = details.with_suggestion(format!(
                    "The file needs a header row with the columns: {}.",
                    REQUIRED_COLUMNS.join(", ")
                ));
                details = details.with_suggestion("Fields must be separated by '|'.".to_string());
            }
            CoreError::InvalidDate { .. } => {
                details = details.with_suggestion(
                    "Use a calendar date such as 2024-01-15 in transaction_date.".to_string(),
                );
            }
            CoreError::InvalidNumber { column, .. } => {
                details = details.with_suggestion(format!(
                    "Every {} value must be a number or left empty.",
                    column
                ));
            }
            CoreError::UploadTooLarge { limit } => {
                details = details.with_suggestion(format!(
                    "Split the file into parts smaller than {} bytes.",
                    limit
                ));
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
