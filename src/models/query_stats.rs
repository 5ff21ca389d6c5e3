use serde::{Deserialize, Serialize};

use super::query_state::QueryState;

/// Execution statistics attached to every poll response.
///
/// Only `state` is interpreted by the driver; everything else
/// (processedRows, wallTimeMillis, rootStage, ...) is carried opaquely and
/// handed to the caller as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStats {
    /// Execution state of the query.
    pub state: QueryState,

    /// All remaining stats fields, untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
