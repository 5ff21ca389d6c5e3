use serde::{Deserialize, Serialize};

/// One column of the result schema, as reported by the coordinator.
///
/// # Example (JSON representation)
///
/// ```json
/// { "name": "cnt", "type": "bigint" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Type name in the coordinator's type system (e.g. `bigint`, `varchar`).
    #[serde(rename = "type")]
    pub type_name: String,
}
