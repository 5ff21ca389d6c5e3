//! Protocol header name tables for the Presto and Trino dialects.
//!
//! The two coordinator families speak the same statement protocol but prefix
//! their headers differently (`X-Presto-*` vs `X-Trino-*`). The dialect is
//! chosen once at client construction and injected everywhere headers are
//! written, so no call site hardcodes a header name.

/// HTTP header names used by one protocol dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSet {
    pub user: &'static str,
    pub source: &'static str,
    pub catalog: &'static str,
    pub schema: &'static str,
    pub time_zone: &'static str,
    pub session: &'static str,
    pub prepare: &'static str,
    pub current_state: &'static str,
    pub max_wait: &'static str,
    pub max_size: &'static str,
    pub page_sequence_id: &'static str,
    pub user_agent: &'static str,
    pub authorization: &'static str,
}

const PRESTO_HEADERS: HeaderSet = HeaderSet {
    user: "X-Presto-User",
    source: "X-Presto-Source",
    catalog: "X-Presto-Catalog",
    schema: "X-Presto-Schema",
    time_zone: "X-Presto-Time-Zone",
    session: "X-Presto-Session",
    prepare: "X-Presto-Prepared-Statement",
    current_state: "X-Presto-Current-State",
    max_wait: "X-Presto-Max-Wait",
    max_size: "X-Presto-Max-Size",
    page_sequence_id: "X-Presto-Page-Sequence-Id",
    user_agent: "User-Agent",
    authorization: "Authorization",
};

const TRINO_HEADERS: HeaderSet = HeaderSet {
    user: "X-Trino-User",
    source: "X-Trino-Source",
    catalog: "X-Trino-Catalog",
    schema: "X-Trino-Schema",
    time_zone: "X-Trino-Time-Zone",
    session: "X-Trino-Session",
    prepare: "X-Trino-Prepared-Statement",
    current_state: "X-Trino-Current-State",
    max_wait: "X-Trino-Max-Wait",
    max_size: "X-Trino-Max-Size",
    page_sequence_id: "X-Trino-Page-Sequence-Id",
    user_agent: "User-Agent",
    authorization: "Authorization",
};

/// Which coordinator family the client talks to.
///
/// Selects the header name table; everything else about the protocol is
/// identical between the two dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderDialect {
    /// Legacy Presto coordinators (`X-Presto-*` headers). The default.
    #[default]
    Presto,
    /// Trino coordinators (`X-Trino-*` headers).
    Trino,
}

impl HeaderDialect {
    /// The header name table for this dialect.
    pub fn headers(&self) -> &'static HeaderSet {
        match self {
            HeaderDialect::Presto => &PRESTO_HEADERS,
            HeaderDialect::Trino => &TRINO_HEADERS,
        }
    }
}
