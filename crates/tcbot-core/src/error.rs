//! Error types for tcbot-core

use thiserror::Error;

/// Errors that can occur while querying, classifying or dumping test cases
#[derive(Error, Debug)]
pub enum BotError {
    /// Neither `--consumed` nor `--provided` was requested
    #[error("either set '--consumed' OR '--provided'")]
    MissingCapabilityScope,

    /// Objective number outside the focus-area range
    #[error("objective {0} is out of range (expected 2..=12)")]
    ObjectiveOutOfRange(u8),

    /// A record has no value for a printout the caller depends on
    #[error("test case {record} has no '{printout}' printout")]
    MissingPrintout { record: String, printout: String },

    /// A printout value carries no display text
    #[error("test case {record} has a '{printout}' value without display text")]
    MalformedPrintout { record: String, printout: String },

    /// Launching the browser failed
    #[error("failed to open browser: {0}")]
    Browser(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Http(err.to_string())
    }
}

/// Result type for tcbot operations.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_scope_message_names_both_flags() {
        let msg = BotError::MissingCapabilityScope.to_string();
        assert!(msg.contains("--consumed"));
        assert!(msg.contains("--provided"));
    }

    #[test]
    fn test_missing_printout_display() {
        let err = BotError::MissingPrintout {
            record: "TC 0042".to_string(),
            printout: "Consumers".to_string(),
        };
        assert_eq!(err.to_string(), "test case TC 0042 has no 'Consumers' printout");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BotError = io.into();
        assert!(matches!(err, BotError::Io(_)));
    }
}
