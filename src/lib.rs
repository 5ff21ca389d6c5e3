//! Async client driver for the Presto/Trino statement-execution protocol.
//!
//! A statement is submitted with `POST /v1/statement`; the coordinator
//! answers immediately with a query handle and a continuation location. The
//! driver polls that location, surfacing execution state, result schema and
//! row pages as they become available, until a response arrives without a
//! continuation location. Transient server errors (502/503/504) are
//! resubmitted indefinitely with jittered pacing, bounded only by the
//! configurable per-execution deadline; cooperative cancellation releases
//! the query server-side.
//!
//! # Example
//!
//! ```rust,no_run
//! use presto_link::{PrestoLinkClient, QueryEvents, StatementRequest};
//!
//! # async fn example() -> presto_link::Result<()> {
//! let client = PrestoLinkClient::builder()
//!     .host("localhost")
//!     .port(8080)
//!     .user("myname")
//!     .catalog("tpch")
//!     .schema("tiny")
//!     .build()?;
//!
//! let events = QueryEvents::new()
//!     .on_state(|id, stats| println!("query {} is {}", id, stats.state))
//!     .on_data(|rows, _columns, _stats| println!("{} rows", rows.len()));
//!
//! let outcome = client
//!     .execute(StatementRequest::new("SELECT count(*) FROM lineitem"), &events)
//!     .await?;
//! println!("done: {:?}", outcome.stats.extra.get("processedRows"));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod events;
pub mod headers;
pub mod models;
pub mod statement;

mod retry;
mod transport;

pub use auth::AuthProvider;
pub use client::{PrestoLinkClient, PrestoLinkClientBuilder};
pub use error::{PrestoLinkError, Result};
pub use events::QueryEvents;
pub use headers::{HeaderDialect, HeaderSet};
pub use models::{Column, QueryError, QueryResults, QueryState, QueryStats, StatementHandle};
pub use statement::{CancelChecker, QuerySuccess, StatementRequest};
