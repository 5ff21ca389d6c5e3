/// Identity of one submitted query, fixed for its entire lifetime.
///
/// Created from the first successful submission response and used only for
/// out-of-band cancellation and info lookups; the poll loop itself follows
/// continuation locations instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementHandle {
    /// Coordinator-assigned query id.
    pub id: String,

    /// Location for query introspection (`GET /v1/query/{id}`).
    pub info_uri: String,
}

impl StatementHandle {
    pub fn new(id: impl Into<String>, info_uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            info_uri: info_uri.into(),
        }
    }
}
