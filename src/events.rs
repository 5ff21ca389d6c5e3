//! Progress event hooks for one statement execution.
//!
//! All hooks are optional. The builder pattern makes it easy to register
//! only the hooks you need. Hooks are `Send + Sync` so they work with the
//! async tokio runtime.
//!
//! - [`on_state`](QueryEvents::on_state): fired when the reported execution
//!   state changes (or on every poll in verbose mode)
//! - [`on_columns`](QueryEvents::on_columns): fired at most once, when the
//!   result schema first appears
//! - [`on_data`](QueryEvents::on_data): fired for every page of rows; may
//!   fire repeatedly as result pages stream in
//! - [`on_retry`](QueryEvents::on_retry): fired each time a transient server
//!   error causes a resubmission
//!
//! The terminal success/error outcome is the `Result` returned by
//! [`execute`](crate::PrestoLinkClient::execute), not an event: an execution
//! resolves exactly once, by construction.
//!
//! # Example
//!
//! ```rust
//! use presto_link::QueryEvents;
//!
//! let events = QueryEvents::new()
//!     .on_state(|id, stats| println!("query {} is {}", id, stats.state))
//!     .on_data(|rows, _columns, _stats| println!("{} rows", rows.len()));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::models::{Column, QueryStats};

/// Type alias for the on_state hook.
pub type OnStateCallback = Arc<dyn Fn(&str, &QueryStats) + Send + Sync>;

/// Type alias for the on_columns hook.
pub type OnColumnsCallback = Arc<dyn Fn(&[Column]) + Send + Sync>;

/// Type alias for the on_data hook.
pub type OnDataCallback =
    Arc<dyn Fn(&[Vec<serde_json::Value>], Option<&[Column]>, &QueryStats) + Send + Sync>;

/// Type alias for the on_retry hook.
pub type OnRetryCallback = Arc<dyn Fn() + Send + Sync>;

/// Progress hooks dispatched while a statement executes.
#[derive(Clone, Default)]
pub struct QueryEvents {
    pub(crate) on_state: Option<OnStateCallback>,
    pub(crate) on_columns: Option<OnColumnsCallback>,
    pub(crate) on_data: Option<OnDataCallback>,
    pub(crate) on_retry: Option<OnRetryCallback>,
}

impl fmt::Debug for QueryEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEvents")
            .field("on_state", &self.on_state.is_some())
            .field("on_columns", &self.on_columns.is_some())
            .field("on_data", &self.on_data.is_some())
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

impl QueryEvents {
    /// Create an empty `QueryEvents` (no hooks registered).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook invoked when the reported execution state changes.
    ///
    /// Receives the query id and the stats of the poll that reported the new
    /// state. Fires once per distinct state, or on every poll when the
    /// client was built with verbose state events.
    pub fn on_state(mut self, f: impl Fn(&str, &QueryStats) + Send + Sync + 'static) -> Self {
        self.on_state = Some(Arc::new(f));
        self
    }

    /// Register a hook invoked when the result schema first appears.
    ///
    /// Fires at most once per execution.
    pub fn on_columns(mut self, f: impl Fn(&[Column]) + Send + Sync + 'static) -> Self {
        self.on_columns = Some(Arc::new(f));
        self
    }

    /// Register a hook invoked for every page of row data.
    ///
    /// Receives the rows, the columns of the response that carried them
    /// (when present), and the stats.
    pub fn on_data(
        mut self,
        f: impl Fn(&[Vec<serde_json::Value>], Option<&[Column]>, &QueryStats) + Send + Sync + 'static,
    ) -> Self {
        self.on_data = Some(Arc::new(f));
        self
    }

    /// Register a hook invoked each time a transient server error causes the
    /// request to be resubmitted.
    pub fn on_retry(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(f));
        self
    }

    // ---------------------------------------------------------------
    // Internal dispatch helpers
    // ---------------------------------------------------------------

    pub(crate) fn emit_state(&self, id: &str, stats: &QueryStats) {
        if let Some(cb) = &self.on_state {
            cb(id, stats);
        }
    }

    pub(crate) fn emit_columns(&self, columns: &[Column]) {
        if let Some(cb) = &self.on_columns {
            cb(columns);
        }
    }

    pub(crate) fn emit_data(
        &self,
        rows: &[Vec<serde_json::Value>],
        columns: Option<&[Column]>,
        stats: &QueryStats,
    ) {
        if let Some(cb) = &self.on_data {
            cb(rows, columns, stats);
        }
    }

    pub(crate) fn emit_retry(&self) {
        if let Some(cb) = &self.on_retry {
            cb();
        }
    }
}
