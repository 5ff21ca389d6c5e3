use serde::{Deserialize, Serialize};

/// Execution state reported in `stats.state` of every poll response.
///
/// QUEUED, PLANNING and STARTING are always non-terminal. RUNNING is
/// non-terminal only while the response carries no row data. FINISHED,
/// CANCELED and FAILED are terminal from the protocol's perspective, but the
/// driver stops on the absence of a continuation location regardless of the
/// state name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    Queued,
    Planning,
    Starting,
    Running,
    Finished,
    Canceled,
    Failed,
    /// A state name this client does not know. Terminality is decided by the
    /// presence of a continuation location alone.
    #[serde(untagged)]
    Other(String),
}

impl QueryState {
    /// `true` for the states that never carry a completed result.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            QueryState::Queued | QueryState::Planning | QueryState::Starting
        )
    }
}

impl std::fmt::Display for QueryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryState::Queued => write!(f, "QUEUED"),
            QueryState::Planning => write!(f, "PLANNING"),
            QueryState::Starting => write!(f, "STARTING"),
            QueryState::Running => write!(f, "RUNNING"),
            QueryState::Finished => write!(f, "FINISHED"),
            QueryState::Canceled => write!(f, "CANCELED"),
            QueryState::Failed => write!(f, "FAILED"),
            QueryState::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_states_decode() {
        let state: QueryState = serde_json::from_str("\"QUEUED\"").unwrap();
        assert_eq!(state, QueryState::Queued);
        let state: QueryState = serde_json::from_str("\"FINISHED\"").unwrap();
        assert_eq!(state, QueryState::Finished);
    }

    #[test]
    fn test_unknown_state_decodes_as_other() {
        let state: QueryState = serde_json::from_str("\"WAITING_FOR_RESOURCES\"").unwrap();
        assert_eq!(state, QueryState::Other("WAITING_FOR_RESOURCES".to_string()));
        assert!(!state.is_waiting());
    }

    #[test]
    fn test_waiting_states() {
        assert!(QueryState::Queued.is_waiting());
        assert!(QueryState::Planning.is_waiting());
        assert!(QueryState::Starting.is_waiting());
        assert!(!QueryState::Running.is_waiting());
        assert!(!QueryState::Finished.is_waiting());
    }
}
