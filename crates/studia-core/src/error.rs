//! Error types for the studia extraction service.

use thiserror::Error;

/// Result type alias using studia's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for extraction operations.
///
/// Variants line up with the failure categories surfaced to callers:
/// authentication, validation, parsing, gateway, empty result, and
/// unexpected infrastructure errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found, or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Downloaded file exceeds the configured ceiling
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    /// Old binary Word format, never extracted
    #[error("Legacy .doc files are not supported. Please re-save the document as .docx and upload it again")]
    LegacyDocFormat,

    /// File type with no extraction strategy
    #[error("Unsupported file type: {0}. Supported formats are PDF, DOCX, PNG, JPG and WEBP")]
    UnsupportedFormat(String),

    /// Document container or XML structure could not be read
    #[error("Parse error: {0}")]
    Parse(String),

    /// LLM gateway answered 429
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// LLM gateway answered 413
    #[error("File too large for AI extraction: {0}")]
    GatewayPayloadTooLarge(String),

    /// LLM gateway answered any other non-2xx status
    #[error("Gateway returned {status}: {body}")]
    Gateway { status: u16, body: String },

    /// Extraction produced too little text to be useful
    #[error("Extracted text too short ({length} characters)")]
    EmptyResult { length: usize },

    /// Object storage operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may usefully try the same request again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("material".to_string());
        assert_eq!(err.to_string(), "Not found: material");
    }

    #[test]
    fn test_error_display_file_too_large() {
        let err = Error::FileTooLarge {
            size: 20,
            limit: 10,
        };
        assert_eq!(
            err.to_string(),
            "File too large: 20 bytes exceeds the 10 byte limit"
        );
    }

    #[test]
    fn test_error_display_legacy_doc_mentions_docx() {
        let err = Error::LegacyDocFormat;
        assert!(err.to_string().contains(".docx"));
    }

    #[test]
    fn test_error_display_unsupported_format() {
        let err = Error::UnsupportedFormat("text/csv".to_string());
        assert!(err.to_string().starts_with("Unsupported file type: text/csv"));
    }

    #[test]
    fn test_error_display_gateway() {
        let err = Error::Gateway {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Gateway returned 502: bad gateway");
    }

    #[test]
    fn test_error_display_empty_result() {
        let err = Error::EmptyResult { length: 2 };
        assert_eq!(err.to_string(), "Extracted text too short (2 characters)");
    }

    #[test]
    fn test_rate_limit_is_transient() {
        assert!(Error::RateLimited("slow down".to_string()).is_transient());
        assert!(!Error::GatewayPayloadTooLarge("big".to_string()).is_transient());
        assert!(!Error::LegacyDocFormat.is_transient());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
