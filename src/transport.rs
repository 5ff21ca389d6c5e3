//! Single-request HTTP layer with response classification.
//!
//! One [`Transport`] is shared by all executions of a client. It resolves
//! structured requests against the configured coordinator, follows absolute
//! continuation locations verbatim (they may point at a different host),
//! applies identity/source/user-agent/authorization headers, and classifies
//! the terminal response. Redirects are followed transparently by reqwest's
//! default policy, and pooled connections are keyed by scheme/host/port, so
//! a connection is never reused across protocol schemes.

use log::debug;
use reqwest::Method;

use crate::auth::AuthProvider;
use crate::error::{PrestoLinkError, Result};
use crate::headers::HeaderDialect;
use crate::models::QueryResults;

/// Where a request goes.
#[derive(Debug, Clone)]
pub(crate) enum Target {
    /// Path resolved against the configured scheme/host/port.
    Path(String),
    /// Absolute location returned by the coordinator (continuation, info,
    /// cancel).
    Location(String),
}

/// One request, self-contained so a transient failure can resubmit it
/// unchanged.
#[derive(Debug, Clone)]
pub(crate) struct RequestSpec {
    pub method: Method,
    pub target: Target,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl RequestSpec {
    pub fn get_path(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            target: Target::Path(path.into()),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get_location(location: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            target: Target::Location(location.into()),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_path(
        path: impl Into<String>,
        headers: Vec<(&'static str, String)>,
        body: String,
    ) -> Self {
        Self {
            method: Method::POST,
            target: Target::Path(path.into()),
            headers,
            body: Some(body),
        }
    }

    pub fn delete_path(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            target: Target::Path(path.into()),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn delete_location(location: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            target: Target::Location(location.into()),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Classified success of one statement-protocol request.
#[derive(Debug)]
pub(crate) enum Reply {
    /// 200 with a decoded statement-protocol body.
    Results(QueryResults),
    /// 204 acknowledgment for a DELETE: the query was released server-side.
    CancelAck,
}

/// Stateless request sender shared by all executions of one client.
#[derive(Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    user: Option<String>,
    source: String,
    user_agent: String,
    auth: AuthProvider,
    dialect: HeaderDialect,
}

impl Transport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        user: Option<String>,
        source: String,
        user_agent: String,
        auth: AuthProvider,
        dialect: HeaderDialect,
    ) -> Self {
        Self {
            http,
            base_url,
            user,
            source,
            user_agent,
            auth,
            dialect,
        }
    }

    /// Send one request and classify the response.
    ///
    /// - `DELETE` answered 204 ⇒ [`Reply::CancelAck`]
    /// - 200 ⇒ decoded [`Reply::Results`]; an undecodable body is
    ///   [`PrestoLinkError::MalformedBody`], distinct from transport errors
    /// - any other status ⇒ [`PrestoLinkError::InvalidResponseCode`] with the
    ///   raw body attached when one exists
    pub async fn send(&self, spec: RequestSpec) -> Result<Reply> {
        let method = spec.method.clone();
        let response = self.dispatch(spec).await?;
        let code = response.status().as_u16();

        if method == Method::DELETE && code == 204 {
            return Ok(Reply::CancelAck);
        }

        let text = response.text().await?;
        if code == 200 {
            match serde_json::from_str::<QueryResults>(&text) {
                Ok(results) => Ok(Reply::Results(results)),
                Err(e) => {
                    debug!("[HTTP] undecodable 200 body: {}", e);
                    Err(PrestoLinkError::MalformedBody { raw: text })
                }
            }
        } else {
            Err(PrestoLinkError::InvalidResponseCode {
                code,
                body: if text.is_empty() { None } else { Some(text) },
            })
        }
    }

    /// Send one request and return the raw status and body text.
    ///
    /// Used by the introspection endpoints, whose bodies are not
    /// statement-protocol shapes.
    pub async fn send_text(&self, spec: RequestSpec) -> Result<(u16, String)> {
        let response = self.dispatch(spec).await?;
        let code = response.status().as_u16();
        let body = response.text().await?;
        Ok((code, body))
    }

    async fn dispatch(&self, spec: RequestSpec) -> Result<reqwest::Response> {
        let url = match &spec.target {
            Target::Path(path) => format!("{}{}", self.base_url, path),
            Target::Location(location) => location.clone(),
        };
        debug!("[HTTP] {} {}", spec.method, url);

        let names = self.dialect.headers();
        let mut request = self.http.request(spec.method, &url);

        if let Some(user) = &self.user {
            request = request.header(names.user, user);
        }
        request = request.header(names.source, &self.source);
        request = request.header(names.user_agent, &self.user_agent);
        if let Some(value) = self.auth.header_value() {
            request = request.header(names.authorization, value);
        }
        for (name, value) in &spec.headers {
            request = request.header(*name, value);
        }
        if let Some(body) = spec.body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }
}
