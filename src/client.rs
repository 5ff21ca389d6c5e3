//! Main coordinator client with builder pattern.
//!
//! Provides the primary interface for submitting statements to a Presto or
//! Trino coordinator and for the out-of-band introspection calls that share
//! its transport.

use std::time::Duration;

use log::warn;

use crate::auth::AuthProvider;
use crate::error::{PrestoLinkError, Result};
use crate::events::QueryEvents;
use crate::headers::HeaderDialect;
use crate::statement::{ExecutorConfig, QuerySuccess, StatementExecutor, StatementRequest};
use crate::transport::{RequestSpec, Transport};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SOURCE: &str = "presto-link";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(800);
const USER_AGENT: &str = concat!("presto-link ", env!("CARGO_PKG_VERSION"));

/// Main coordinator client.
///
/// Use [`PrestoLinkClientBuilder`] to construct instances with custom
/// configuration. The client is cheap to clone; concurrent executions share
/// only immutable configuration and the underlying connection pool.
///
/// # Examples
///
/// ```rust,no_run
/// use presto_link::{PrestoLinkClient, QueryEvents, StatementRequest};
///
/// # async fn example() -> presto_link::Result<()> {
/// let client = PrestoLinkClient::builder()
///     .host("localhost")
///     .port(8080)
///     .user("myname")
///     .catalog("hive")
///     .schema("default")
///     .build()?;
///
/// let events = QueryEvents::new()
///     .on_data(|rows, _columns, _stats| println!("{} rows", rows.len()));
/// let outcome = client
///     .execute(StatementRequest::new("SELECT 1 AS col"), &events)
///     .await?;
/// println!("finished in state {}", outcome.stats.state);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PrestoLinkClient {
    transport: Transport,
    executor: StatementExecutor,
}

impl PrestoLinkClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> PrestoLinkClientBuilder {
        PrestoLinkClientBuilder::new()
    }

    /// Execute a statement to its single terminal outcome.
    ///
    /// Progress (state changes, result schema, row pages, retries) is
    /// dispatched through `events` while the execution runs; the returned
    /// `Result` is the exactly-once success or error outcome.
    pub async fn execute(
        &self,
        request: StatementRequest,
        events: &QueryEvents,
    ) -> Result<QuerySuccess> {
        self.executor.execute(request, events).await
    }

    /// List the coordinator's worker nodes (`GET /v1/node`).
    pub async fn nodes(&self) -> Result<serde_json::Value> {
        self.fetch_json(RequestSpec::get_path("/v1/node"), "node list api returns error")
            .await
    }

    /// Fetch the full info body of one query (`GET /v1/query/{id}`).
    pub async fn query_info(&self, query_id: &str) -> Result<serde_json::Value> {
        self.fetch_json(
            RequestSpec::get_path(format!("/v1/query/{}", query_id)),
            "query info api returns error",
        )
        .await
    }

    /// Kill one query (`DELETE /v1/query/{id}`), expecting 204.
    pub async fn kill(&self, query_id: &str) -> Result<()> {
        let spec = RequestSpec::delete_path(format!("/v1/query/{}", query_id));
        let (code, body) = match self.transport.send_text(spec).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("[HTTP] kill failed: {}", e);
                return Err(PrestoLinkError::Execution {
                    message: "query kill api returns error".to_string(),
                    code: None,
                });
            }
        };
        if code != 204 {
            return Err(PrestoLinkError::Execution {
                message: annotate("query kill api returns error", &body),
                code: Some(code),
            });
        }
        Ok(())
    }

    async fn fetch_json(&self, spec: RequestSpec, prefix: &str) -> Result<serde_json::Value> {
        let (code, body) = match self.transport.send_text(spec).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("[HTTP] {}: {}", prefix, e);
                return Err(PrestoLinkError::Execution {
                    message: prefix.to_string(),
                    code: None,
                });
            }
        };
        if code != 200 {
            return Err(PrestoLinkError::Execution {
                message: annotate(prefix, &body),
                code: Some(code),
            });
        }
        serde_json::from_str(&body).map_err(|_| PrestoLinkError::MalformedBody { raw: body })
    }
}

fn annotate(prefix: &str, body: &str) -> String {
    if body.is_empty() {
        prefix.to_string()
    } else {
        format!("{}:{}", prefix, body)
    }
}

/// Builder for configuring [`PrestoLinkClient`] instances.
pub struct PrestoLinkClientBuilder {
    host: Option<String>,
    port: u16,
    tls: bool,
    user: Option<String>,
    source: String,
    basic_auth: Option<(String, String)>,
    custom_auth: Option<String>,
    catalog: Option<String>,
    schema: Option<String>,
    poll_interval: Duration,
    statement_timeout: Option<Duration>,
    verbose_state_events: bool,
    dialect: HeaderDialect,
}

impl PrestoLinkClientBuilder {
    fn new() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            tls: false,
            user: None,
            source: DEFAULT_SOURCE.to_string(),
            basic_auth: None,
            custom_auth: None,
            catalog: None,
            schema: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            statement_timeout: None,
            verbose_state_events: false,
            dialect: HeaderDialect::default(),
        }
    }

    /// Coordinator host name. Required.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Coordinator port. Defaults to 8080.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use HTTPS for coordinator requests.
    pub fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Identity sent in the dialect's user header.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Source tag reported to the coordinator. Defaults to `presto-link`.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// HTTP Basic Auth credentials. Mutually exclusive with
    /// [`custom_auth`](Self::custom_auth); configuring both fails `build()`.
    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), password.into()));
        self
    }

    /// Verbatim Authorization header value. Mutually exclusive with
    /// [`basic_auth`](Self::basic_auth); configuring both fails `build()`.
    pub fn custom_auth(mut self, value: impl Into<String>) -> Self {
        self.custom_auth = Some(value.into());
        self
    }

    /// Default catalog for statements that do not set one.
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Default schema for statements that do not set one. Requires a
    /// catalog at execution time.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Delay between continuation polls. Defaults to 800ms.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overall per-execution deadline. Zero or unset disables it. On expiry
    /// the driver kills the query server-side (best-effort) and resolves
    /// with a timeout error.
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Fire the state event on every poll instead of only on state changes.
    pub fn verbose_state_events(mut self, verbose: bool) -> Self {
        self.verbose_state_events = verbose;
        self
    }

    /// Protocol dialect (header naming scheme). Defaults to Presto.
    pub fn dialect(mut self, dialect: HeaderDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Build the client.
    ///
    /// Fails on a missing host or on conflicting authentication; those are
    /// the only construction-time errors.
    pub fn build(self) -> Result<PrestoLinkClient> {
        let host = self
            .host
            .ok_or_else(|| PrestoLinkError::Configuration("host is required".to_string()))?;

        let auth = match (self.basic_auth, self.custom_auth) {
            (Some(_), Some(_)) => {
                return Err(PrestoLinkError::Configuration(
                    "both basic and custom authorization are configured; set only one"
                        .to_string(),
                ))
            }
            (Some((user, password)), None) => AuthProvider::basic_auth(user, password),
            (None, Some(value)) => AuthProvider::custom(value),
            (None, None) => AuthProvider::none(),
        };

        let scheme = if self.tls { "https" } else { "http" };
        let base_url = format!("{}://{}:{}", scheme, host, self.port);

        // Keep-alive pooling; reqwest keys pooled connections by
        // scheme/host/port, so https and http never share a connection.
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| PrestoLinkError::Configuration(e.to_string()))?;

        let transport = Transport::new(
            http,
            base_url,
            self.user,
            self.source,
            USER_AGENT.to_string(),
            auth,
            self.dialect,
        );
        let executor = StatementExecutor::new(
            transport.clone(),
            ExecutorConfig {
                catalog: self.catalog,
                schema: self.schema,
                poll_interval: self.poll_interval,
                statement_timeout: self.statement_timeout,
                verbose_state_events: self.verbose_state_events,
                dialect: self.dialect,
            },
        );

        Ok(PrestoLinkClient {
            transport,
            executor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let result = PrestoLinkClient::builder()
            .host("localhost")
            .port(8080)
            .user("myname")
            .catalog("hive")
            .schema("default")
            .poll_interval(Duration::from_millis(100))
            .build();

        assert!(result.is_ok());
    }

    #[test]
    fn test_builder_missing_host() {
        let result = PrestoLinkClient::builder().build();
        assert!(matches!(
            result,
            Err(PrestoLinkError::Configuration(ref m)) if m.contains("host")
        ));
    }

    #[test]
    fn test_builder_rejects_conflicting_auth() {
        let result = PrestoLinkClient::builder()
            .host("localhost")
            .basic_auth("alice", "secret")
            .custom_auth("Bearer token")
            .build();
        assert!(matches!(result, Err(PrestoLinkError::Configuration(_))));
    }

    #[test]
    fn test_builder_accepts_single_auth() {
        assert!(PrestoLinkClient::builder()
            .host("localhost")
            .basic_auth("alice", "secret")
            .build()
            .is_ok());
        assert!(PrestoLinkClient::builder()
            .host("localhost")
            .custom_auth("Bearer token")
            .build()
            .is_ok());
    }

    #[test]
    fn test_annotate() {
        assert_eq!(
            annotate("query info api returns error", "gone"),
            "query info api returns error:gone"
        );
        assert_eq!(
            annotate("query info api returns error", ""),
            "query info api returns error"
        );
    }
}
