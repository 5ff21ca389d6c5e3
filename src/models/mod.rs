//! Typed view over the coordinator's statement-protocol JSON bodies.
//!
//! Every poll response is decoded into [`QueryResults`] with explicit
//! optional fields; a body that does not decode is a distinct error kind,
//! never silently shape-sniffed.

pub mod column;
pub mod query_error;
pub mod query_results;
pub mod query_state;
pub mod query_stats;
pub mod statement_handle;

pub use column::Column;
pub use query_error::QueryError;
pub use query_results::QueryResults;
pub use query_state::QueryState;
pub use query_stats::QueryStats;
pub use statement_handle::StatementHandle;
