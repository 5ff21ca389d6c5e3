use serde::{Deserialize, Serialize};

use super::{column::Column, query_error::QueryError, query_stats::QueryStats};

/// One statement-protocol response body.
///
/// The same shape is returned by the initial `POST /v1/statement` and by
/// every continuation `GET`. Fields the coordinator omits in a given
/// response are `None`; absence of `next_uri` is the authoritative signal
/// that the execution is complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    /// Query id, stable across the whole poll sequence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Location for out-of-band query introspection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_uri: Option<String>,

    /// Continuation location to poll next. May point at a different host
    /// than the original coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_uri: Option<String>,

    /// Location for canceling an individual stage, when offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_cancel_uri: Option<String>,

    /// Result schema, first delivered once planning has resolved it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,

    /// One page of row data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<serde_json::Value>>>,

    /// Execution statistics, including the state.
    pub stats: QueryStats,

    /// Embedded error. Overrides state interpretation when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryError>,
}
