//! Error types for presto-link.

use crate::models::QueryError;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PrestoLinkError>;

/// Every way a coordinator interaction can fail.
///
/// Construction problems surface synchronously from `build()` or `execute()`;
/// everything else resolves the execution's single terminal outcome.
#[derive(Error, Debug)]
pub enum PrestoLinkError {
    /// Invalid client or statement configuration. Never produced by network
    /// activity.
    #[error("{0}")]
    Configuration(String),

    /// Connection-level failure from the HTTP layer.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A 200 response whose body does not decode as a statement-protocol
    /// shape. The raw text is preserved for diagnostics.
    #[error("could not parse response: {raw}")]
    MalformedBody { raw: String },

    /// A non-success status outside the transient set.
    #[error("invalid response code ({code})")]
    InvalidResponseCode { code: u16, body: Option<String> },

    /// A required field was missing from an otherwise valid response.
    #[error("{0}")]
    Protocol(String),

    /// Submission-phase failure, formatted to prefer the coordinator's
    /// embedded error message over the raw body.
    #[error("{message}")]
    Execution { message: String, code: Option<u16> },

    /// Error object reported by the coordinator during polling, passed
    /// through verbatim.
    #[error("{}", .0.message)]
    QueryFailure(QueryError),

    /// Execution stopped by the caller's cancel check.
    #[error("{message}")]
    Canceled { message: String },

    /// The configured execution deadline expired before the query completed.
    #[error("execution error:query timed out")]
    Timeout,
}

impl PrestoLinkError {
    /// HTTP status code associated with this error, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            PrestoLinkError::InvalidResponseCode { code, .. } => Some(*code),
            PrestoLinkError::Execution { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            PrestoLinkError::Timeout.to_string(),
            "execution error:query timed out"
        );
    }

    #[test]
    fn test_query_failure_displays_server_message() {
        let err = PrestoLinkError::QueryFailure(QueryError {
            message: "Table tpch.tiny.non_existent_table does not exist".to_string(),
            error_code: Some(46),
            error_name: Some("TABLE_NOT_FOUND".to_string()),
            error_type: Some("USER_ERROR".to_string()),
        });
        assert_eq!(
            err.to_string(),
            "Table tpch.tiny.non_existent_table does not exist"
        );
    }

    #[test]
    fn test_status_extraction() {
        let err = PrestoLinkError::InvalidResponseCode {
            code: 410,
            body: None,
        };
        assert_eq!(err.status(), Some(410));
        assert_eq!(PrestoLinkError::Timeout.status(), None);
    }
}
