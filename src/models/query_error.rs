use serde::{Deserialize, Serialize};

/// Error object embedded in a statement-protocol response body.
///
/// Reported verbatim when a poll response carries it; its presence overrides
/// whatever the `state` field claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    /// Human-readable error message from the coordinator.
    pub message: String,

    /// Numeric error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,

    /// Symbolic error name (e.g. `TABLE_NOT_FOUND`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_name: Option<String>,

    /// Error category (e.g. `USER_ERROR`, `INTERNAL_ERROR`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
