//! Authentication for coordinator requests.
//!
//! Supports HTTP Basic Auth and a caller-supplied raw Authorization value
//! (for bearer tokens, Kerberos negotiation products, and similar schemes the
//! coordinator sits behind). Configuring both on one client is rejected when
//! the client is built, never at request time.

use base64::{engine::general_purpose, Engine as _};

/// Authentication credentials applied to every coordinator request.
///
/// # Examples
///
/// ```rust
/// use presto_link::AuthProvider;
///
/// // HTTP Basic Auth (RFC 7617)
/// let auth = AuthProvider::basic_auth("alice".to_string(), "secret".to_string());
///
/// // Raw Authorization value, passed through verbatim
/// let auth = AuthProvider::custom("Bearer eyJhbGc...".to_string());
///
/// // No authentication
/// let auth = AuthProvider::none();
/// ```
#[derive(Debug, Clone, Default)]
pub enum AuthProvider {
    /// HTTP Basic Auth (username, password).
    BasicAuth(String, String),

    /// Verbatim Authorization header value.
    Custom(String),

    /// No authentication.
    #[default]
    None,
}

impl AuthProvider {
    /// Create HTTP Basic Auth credentials.
    ///
    /// Encodes `username:password` as base64 for the Authorization header
    /// following RFC 7617.
    pub fn basic_auth(username: String, password: String) -> Self {
        Self::BasicAuth(username, password)
    }

    /// Use a caller-supplied Authorization header value verbatim.
    pub fn custom(value: String) -> Self {
        Self::Custom(value)
    }

    /// No authentication.
    pub fn none() -> Self {
        Self::None
    }

    /// The Authorization header value for this provider, if any.
    pub(crate) fn header_value(&self) -> Option<String> {
        match self {
            Self::BasicAuth(username, password) => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {}", encoded))
            }
            Self::Custom(value) => Some(value.clone()),
            Self::None => None,
        }
    }

    /// Check if authentication is configured.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_encoding() {
        let auth = AuthProvider::basic_auth("alice".to_string(), "secret123".to_string());
        assert_eq!(
            auth.header_value().as_deref(),
            Some("Basic YWxpY2U6c2VjcmV0MTIz")
        );
    }

    #[test]
    fn test_custom_auth_passes_through() {
        let auth = AuthProvider::custom("Bearer token-abc".to_string());
        assert_eq!(auth.header_value().as_deref(), Some("Bearer token-abc"));
    }

    #[test]
    fn test_none_has_no_header() {
        assert!(AuthProvider::none().header_value().is_none());
        assert!(!AuthProvider::none().is_authenticated());
        assert!(AuthProvider::custom("x".into()).is_authenticated());
    }
}
