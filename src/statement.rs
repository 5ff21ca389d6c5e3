//! Statement execution: the poll loop, state machine, and
//! timeout/cancellation controller.
//!
//! One execution submits `POST /v1/statement`, then follows the continuation
//! location the coordinator returns until a response arrives without one.
//! Transient server statuses are resubmitted indefinitely with jittered
//! pacing; the overall deadline and the caller's cancel check are the only
//! things that stop a retrying execution.
//!
//! Exactly one outcome per execution is guaranteed by construction: the
//! terminal success or error is the `Result` this module returns, while
//! progress (state changes, schema, row pages, retries) is dispatched
//! through [`QueryEvents`] hooks before the outcome resolves.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};

use crate::error::{PrestoLinkError, Result};
use crate::events::QueryEvents;
use crate::headers::HeaderDialect;
use crate::models::{Column, QueryResults, QueryState, QueryStats, StatementHandle};
use crate::retry;
use crate::transport::{Reply, RequestSpec, Transport};

/// Caller-supplied cooperative cancel check, polled before every
/// continuation request and before each transient resubmission.
pub type CancelChecker = Arc<dyn Fn() -> bool + Send + Sync>;

/// One SQL statement plus its per-execution options.
///
/// Catalog and schema fall back to the client defaults when unset here.
///
/// # Example
///
/// ```rust
/// use presto_link::StatementRequest;
///
/// let request = StatementRequest::new("SELECT count(*) FROM lineitem")
///     .catalog("tpch")
///     .schema("tiny")
///     .fetch_info(true);
/// ```
pub struct StatementRequest {
    pub(crate) query: String,
    pub(crate) catalog: Option<String>,
    pub(crate) schema: Option<String>,
    pub(crate) session: Option<String>,
    pub(crate) timezone: Option<String>,
    pub(crate) prepared_statements: Vec<(String, String)>,
    pub(crate) fetch_info: bool,
    pub(crate) cancel: Option<CancelChecker>,
}

impl StatementRequest {
    /// A statement with no per-execution overrides.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            catalog: None,
            schema: None,
            session: None,
            timezone: None,
            prepared_statements: Vec::new(),
            fetch_info: false,
            cancel: None,
        }
    }

    /// Catalog for this execution, overriding the client default.
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Schema for this execution, overriding the client default.
    ///
    /// A schema requires a catalog (here or on the client); `execute`
    /// rejects the combination synchronously otherwise.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Session properties, passed through in the dialect's session header.
    pub fn session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Time zone for this execution.
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Register a prepared statement binding sent in the dialect's
    /// prepared-statement header. May be called repeatedly.
    pub fn prepared_statement(
        mut self,
        name: impl Into<String>,
        statement: impl Into<String>,
    ) -> Self {
        self.prepared_statements
            .push((name.into(), statement.into()));
        self
    }

    /// Also fetch the query-info body after completion and attach it to the
    /// success outcome. Best-effort: an unreachable info endpoint does not
    /// fail a finished query.
    pub fn fetch_info(mut self, fetch_info: bool) -> Self {
        self.fetch_info = fetch_info;
        self
    }

    /// Cooperative cancellation: the predicate is polled before every
    /// continuation request and before each transient resubmission. When it
    /// reports true the driver cancels the query server-side and resolves
    /// with a cancellation error.
    pub fn cancel_when(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.cancel = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for StatementRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementRequest")
            .field("query", &self.query)
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .field("session", &self.session)
            .field("timezone", &self.timezone)
            .field("prepared_statements", &self.prepared_statements.len())
            .field("fetch_info", &self.fetch_info)
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

/// Terminal success of one execution.
#[derive(Debug, Clone)]
pub struct QuerySuccess {
    /// Stats of the final poll response.
    pub stats: QueryStats,
    /// Query-info body, when [`StatementRequest::fetch_info`] requested it
    /// and the fetch succeeded.
    pub info: Option<serde_json::Value>,
}

/// Immutable execution settings shared by every statement of one client.
pub(crate) struct ExecutorConfig {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub poll_interval: Duration,
    pub statement_timeout: Option<Duration>,
    pub verbose_state_events: bool,
    pub dialect: HeaderDialect,
}

/// Runs statement executions. Holds no per-execution state; each `execute`
/// call owns its own context, in-flight request, and timers.
#[derive(Clone)]
pub(crate) struct StatementExecutor {
    transport: Transport,
    config: Arc<ExecutorConfig>,
}

/// Mutable state owned by exactly one execution.
struct ExecutionContext {
    last_state: Option<QueryState>,
    columns_reported: bool,
    /// Set once, first-wins. After it is set no event may be dispatched,
    /// even if a late response resolves afterwards.
    terminal: Arc<AtomicBool>,
}

impl ExecutionContext {
    fn new(terminal: Arc<AtomicBool>) -> Self {
        Self {
            last_state: None,
            columns_reported: false,
            terminal,
        }
    }

    fn dispatch_state(&mut self, events: &QueryEvents, verbose: bool, id: &str, stats: &QueryStats) {
        if self.terminal.load(Ordering::SeqCst) {
            return;
        }
        let changed = self.last_state.as_ref() != Some(&stats.state);
        if changed || verbose {
            events.emit_state(id, stats);
            self.last_state = Some(stats.state.clone());
        }
    }

    fn dispatch_columns(&mut self, events: &QueryEvents, columns: &[Column]) {
        if self.terminal.load(Ordering::SeqCst) || self.columns_reported {
            return;
        }
        self.columns_reported = true;
        events.emit_columns(columns);
    }

    fn dispatch_data(
        &self,
        events: &QueryEvents,
        rows: &[Vec<serde_json::Value>],
        columns: Option<&[Column]>,
        stats: &QueryStats,
    ) {
        if self.terminal.load(Ordering::SeqCst) {
            return;
        }
        events.emit_data(rows, columns, stats);
    }
}

impl StatementExecutor {
    pub fn new(transport: Transport, config: ExecutorConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    /// Execute one statement to its single terminal outcome.
    pub async fn execute(
        &self,
        request: StatementRequest,
        events: &QueryEvents,
    ) -> Result<QuerySuccess> {
        let catalog = request.catalog.clone().or_else(|| self.config.catalog.clone());
        let schema = request.schema.clone().or_else(|| self.config.schema.clone());
        if schema.is_some() && catalog.is_none() {
            return Err(PrestoLinkError::Configuration(
                "Catalog not specified; catalog is required if schema is specified".to_string(),
            ));
        }

        let terminal = Arc::new(AtomicBool::new(false));
        let handle_slot: Arc<Mutex<Option<StatementHandle>>> = Arc::new(Mutex::new(None));

        let deadline = self.config.statement_timeout.filter(|d| !d.is_zero());
        match deadline {
            None => {
                self.run(request, catalog, schema, events, &terminal, &handle_slot)
                    .await
            }
            Some(limit) => {
                tokio::select! {
                    outcome = self.run(request, catalog, schema, events, &terminal, &handle_slot) => outcome,
                    _ = tokio::time::sleep(limit) => {
                        // First-wins: suppress anything a late continuation
                        // could still dispatch, then drop the in-flight work.
                        terminal.store(true, Ordering::SeqCst);
                        warn!("[STATEMENT] deadline {:?} expired, killing query", limit);
                        let handle = handle_slot.lock().ok().and_then(|mut slot| slot.take());
                        if let Some(handle) = handle {
                            // Best-effort release of server-side resources on
                            // a detached task; the kill must never delay the
                            // timeout outcome.
                            let transport = self.transport.clone();
                            tokio::spawn(async move {
                                let kill =
                                    RequestSpec::delete_path(format!("/v1/query/{}", handle.id));
                                if let Err(e) = transport.send(kill).await {
                                    debug!("[CANCEL] kill after timeout failed: {}", e);
                                }
                            });
                        }
                        Err(PrestoLinkError::Timeout)
                    }
                }
            }
        }
    }

    async fn run(
        &self,
        request: StatementRequest,
        catalog: Option<String>,
        schema: Option<String>,
        events: &QueryEvents,
        terminal: &Arc<AtomicBool>,
        handle_slot: &Arc<Mutex<Option<StatementHandle>>>,
    ) -> Result<QuerySuccess> {
        let names = self.config.dialect.headers();
        let mut headers: Vec<(&'static str, String)> = Vec::new();
        if let Some(catalog) = catalog {
            headers.push((names.catalog, catalog));
        }
        if let Some(schema) = schema {
            headers.push((names.schema, schema));
        }
        if let Some(session) = &request.session {
            headers.push((names.session, session.clone()));
        }
        if let Some(timezone) = &request.timezone {
            headers.push((names.time_zone, timezone.clone()));
        }
        if !request.prepared_statements.is_empty() {
            headers.push((names.prepare, encode_prepared(&request.prepared_statements)));
        }

        debug!(
            "[STATEMENT] submitting statement ({} bytes)",
            request.query.len()
        );
        let spec = RequestSpec::post_path("/v1/statement", headers, request.query.clone());
        let results = match self
            .send_with_retry(spec, events, terminal, request.cancel.as_ref())
            .await
        {
            Ok(Reply::Results(results)) => results,
            Ok(Reply::CancelAck) => {
                return Err(PrestoLinkError::Protocol(
                    "unexpected empty response for POST /v1/statement".to_string(),
                ))
            }
            Err(e) => return Err(submission_error(e)),
        };
        if let Some(error) = results.error {
            warn!("[STATEMENT] submission rejected: {}", error.message);
            return Err(PrestoLinkError::Execution {
                message: error.message,
                code: Some(200),
            });
        }

        let id = results.id.ok_or_else(|| {
            PrestoLinkError::Protocol(
                "query id missing in response for POST /v1/statement".to_string(),
            )
        })?;
        let mut next_location = results.next_uri.ok_or_else(|| {
            PrestoLinkError::Protocol(
                "nextUri missing in response for POST /v1/statement".to_string(),
            )
        })?;
        let info_uri = results.info_uri.ok_or_else(|| {
            PrestoLinkError::Protocol(
                "infoUri missing in response for POST /v1/statement".to_string(),
            )
        })?;

        if let Ok(mut slot) = handle_slot.lock() {
            *slot = Some(StatementHandle::new(id.clone(), info_uri.clone()));
        }

        let mut ctx = ExecutionContext::new(Arc::clone(terminal));
        loop {
            if let Some(cancel) = &request.cancel {
                if cancel() {
                    debug!("[CANCEL] cancel requested by operation for query {}", id);
                    return Err(self.cancel_fetch(&next_location).await);
                }
            }

            let reply = match self
                .send_with_retry(
                    RequestSpec::get_location(&next_location),
                    events,
                    terminal,
                    request.cancel.as_ref(),
                )
                .await
            {
                Ok(reply) => reply,
                // Cancel during a retry storm still releases the query
                // server-side, like a cancel between polls.
                Err(PrestoLinkError::Canceled { .. }) => {
                    return Err(self.cancel_fetch(&next_location).await)
                }
                Err(e) => return Err(e),
            };
            let results = match reply {
                Reply::Results(results) => results,
                Reply::CancelAck => {
                    return Err(PrestoLinkError::Protocol(
                        "unexpected empty response for continuation request".to_string(),
                    ))
                }
            };

            // An embedded error overrides whatever the state field claims.
            if let Some(error) = results.error {
                warn!("[STATEMENT] query {} failed: {}", id, error.message);
                return Err(PrestoLinkError::QueryFailure(error));
            }

            ctx.dispatch_state(events, self.config.verbose_state_events, &id, &results.stats);
            if let Some(columns) = &results.columns {
                ctx.dispatch_columns(events, columns);
            }

            // RUNNING still counts as waiting until the response carries rows.
            let waiting = results.stats.state.is_waiting()
                || (results.stats.state == QueryState::Running && results.data.is_none());
            if !waiting {
                if let Some(rows) = &results.data {
                    ctx.dispatch_data(events, rows, results.columns.as_deref(), &results.stats);
                }
            }

            // Absence of a continuation location is the authoritative stop
            // signal, whatever the state name says.
            match results.next_uri {
                Some(next) => {
                    tokio::time::sleep(self.config.poll_interval).await;
                    next_location = next;
                }
                None => {
                    let info = if request.fetch_info {
                        self.fetch_info(&info_uri).await
                    } else {
                        None
                    };
                    debug!(
                        "[STATEMENT] query {} complete in state {}",
                        id, results.stats.state
                    );
                    return Ok(QuerySuccess {
                        stats: results.stats,
                        info,
                    });
                }
            }
        }
    }

    /// Resubmit the identical request for as long as the coordinator answers
    /// with a transient status. Bounded only by the overall deadline and the
    /// caller's cancel check, consulted before each resubmission.
    async fn send_with_retry(
        &self,
        spec: RequestSpec,
        events: &QueryEvents,
        terminal: &Arc<AtomicBool>,
        cancel: Option<&CancelChecker>,
    ) -> Result<Reply> {
        let mut attempt: u64 = 0;
        loop {
            match self.transport.send(spec.clone()).await {
                Ok(reply) => return Ok(reply),
                Err(e) => match retry::transient_status(&e) {
                    Some(code) => {
                        if let Some(cancel) = cancel {
                            if cancel() {
                                debug!("[CANCEL] cancel requested during resubmission");
                                return Err(PrestoLinkError::Canceled {
                                    message: "query fetch canceled by operation".to_string(),
                                });
                            }
                        }
                        attempt += 1;
                        let delay = retry::retry_delay(attempt);
                        debug!(
                            "[RETRY] status {}, resubmitting in {:?} (attempt {})",
                            code, delay, attempt
                        );
                        if !terminal.load(Ordering::SeqCst) {
                            events.emit_retry();
                        }
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    /// Cancel on behalf of the caller's cancel check. Never silent: reports
    /// whether the server acknowledged the cancel.
    async fn cancel_fetch(&self, location: &str) -> PrestoLinkError {
        match self
            .transport
            .send(RequestSpec::delete_location(location))
            .await
        {
            Ok(Reply::CancelAck) => PrestoLinkError::Canceled {
                message: "query fetch canceled by operation".to_string(),
            },
            Ok(Reply::Results(_)) | Err(_) => PrestoLinkError::Canceled {
                message: "query fetch canceled, but query cancel may fail".to_string(),
            },
        }
    }

    /// Best-effort; an unreachable info endpoint never fails a finished
    /// query.
    async fn fetch_info(&self, info_uri: &str) -> Option<serde_json::Value> {
        match self
            .transport
            .send_text(RequestSpec::get_location(info_uri))
            .await
        {
            Ok((200, body)) => serde_json::from_str(&body).ok(),
            Ok((code, _)) => {
                debug!("[STATEMENT] info fetch returned {}", code);
                None
            }
            Err(e) => {
                debug!("[STATEMENT] info fetch failed: {}", e);
                None
            }
        }
    }
}

/// Submission-phase failures prefer the embedded error message and fall back
/// to a generic message annotated with the raw body. Poll-phase failures
/// pass through untouched; callers rely on the asymmetry.
fn submission_error(err: PrestoLinkError) -> PrestoLinkError {
    match err {
        PrestoLinkError::InvalidResponseCode { code, body } => {
            if let Some(raw) = &body {
                if let Ok(results) = serde_json::from_str::<QueryResults>(raw) {
                    if let Some(error) = results.error {
                        return PrestoLinkError::Execution {
                            message: error.message,
                            code: Some(code),
                        };
                    }
                }
            }
            let message = match &body {
                Some(raw) if !raw.is_empty() => format!("execution error:{}", raw),
                _ => "execution error".to_string(),
            };
            PrestoLinkError::Execution {
                message,
                code: Some(code),
            }
        }
        PrestoLinkError::Transport(e) => {
            warn!("[STATEMENT] submission failed: {}", e);
            PrestoLinkError::Execution {
                message: "execution error".to_string(),
                code: None,
            }
        }
        other => other,
    }
}

/// `name=percent-encoded-statement` pairs joined with commas, the wire
/// format of the prepared-statement header.
fn encode_prepared(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, statement)| {
            let encoded: String =
                url::form_urlencoded::byte_serialize(statement.as_bytes()).collect();
            format!("{}={}", name, encoded)
        })
        .collect::<Vec<_>>()
        .join(",")
}
