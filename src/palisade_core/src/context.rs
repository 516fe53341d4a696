//! Framework-agnostic request, response and session abstractions.
//!
//! Host web frameworks implement these traits on newtype wrappers of their
//! own request/response types, the same way a store backend implements
//! [`SessionStore`] over its native session mechanism. The engine only ever
//! talks to these traits, so it embeds into any framework without depending
//! on one.
//!
//! Every context exposes a [`ContextScheduler`]: the serialization boundary
//! that owns mutation of this request's associated state. Continuations
//! running on worker threads must marshal mutations back through it.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::flow_action::FlowAction;
use crate::error::EngineResult;
use crate::exec::scheduler::ContextScheduler;

/// A response cookie with its transport attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub http_only: bool,
    pub secure: bool,
    pub max_age: Option<i64>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            http_only: false,
            secure: false,
            max_age: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Serialize to a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);
        if let Some(domain) = &self.domain {
            let _ = write!(header, "; Domain={domain}");
        }
        if let Some(path) = &self.path {
            let _ = write!(header, "; Path={path}");
        }
        if let Some(max_age) = self.max_age {
            let _ = write!(header, "; Max-Age={max_age}");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

/// The request/response surface of one in-flight call.
///
/// Readers return owned values; the engine never assumes the framework can
/// hand out references across await points. Mutators take `&self` and rely
/// on interior mutability; callers touching context-associated state from a
/// continuation must do so through [`WebContext::scheduler`].
pub trait WebContext: Send + Sync {
    /// A query/form parameter by name.
    fn request_parameter(&self, name: &str) -> Option<String>;

    /// A request header by name. Lookup is case-insensitive.
    fn request_header(&self, name: &str) -> Option<String>;

    /// The HTTP method (GET, POST, ...).
    fn request_method(&self) -> String;

    /// The request scheme (http or https).
    fn scheme(&self) -> String;

    fn server_name(&self) -> String;

    fn server_port(&self) -> u16;

    /// The request path, without query string.
    fn path(&self) -> String;

    /// The full URL of the request, including the query string.
    fn full_request_url(&self) -> String;

    fn is_secure(&self) -> bool {
        self.scheme() == "https"
    }

    /// A request-scoped attribute. `Value::Null` reads as absent.
    fn request_attribute(&self, name: &str) -> Option<Value>;

    fn set_request_attribute(&self, name: &str, value: Value);

    fn request_cookie(&self, name: &str) -> Option<String>;

    fn set_response_cookie(&self, cookie: Cookie);

    fn set_response_header(&self, name: &str, value: &str);

    fn set_response_status(&self, code: u16);

    fn write_response_content(&self, content: &str);

    /// The session store bound to this context.
    fn session_store(&self) -> Arc<dyn SessionStore>;

    /// The affinity scheduler owning this context's mutable state.
    fn scheduler(&self) -> Arc<ContextScheduler>;
}

/// Durable per-session storage. All operations are asynchronous: real
/// backends sit behind I/O.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The current session id, creating the session if needed.
    async fn get_or_create_session_id(&self) -> EngineResult<String>;

    /// Read a session entry. Absent keys and sessions read as `None`.
    async fn get(&self, key: &str) -> EngineResult<Option<Value>>;

    /// Write a session entry. Setting `Value::Null` removes the entry.
    async fn set(&self, key: &str, value: Value) -> EngineResult<()>;

    /// Invalidate the whole session. Returns whether a session existed.
    async fn destroy_session(&self) -> EngineResult<bool>;

    /// Rotate the session id, keeping all other session data. Returns
    /// `false` when the backend does not support rotation.
    async fn renew_session(&self) -> EngineResult<bool>;

    /// An opaque handle allowing this session to be re-attached elsewhere,
    /// for stores that support migration.
    async fn trackable_session(&self) -> EngineResult<Option<Value>> {
        Ok(None)
    }

    /// Rebuild a store from a [`SessionStore::trackable_session`] handle.
    async fn session_from_trackable(
        &self,
        _trackable: Value,
    ) -> EngineResult<Option<Arc<dyn SessionStore>>> {
        Ok(None)
    }
}

/// Maps a terminal [`FlowAction`] into a protocol-specific response.
pub trait ResponseAdapter: Send + Sync {
    type Output;

    fn adapt(&self, context: &dyn WebContext, action: FlowAction) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_value_carries_all_attributes() {
        let cookie = Cookie::new("palisadeCsrfToken", "abc123")
            .with_domain("example.org")
            .with_path("/")
            .with_max_age(3600)
            .http_only(true)
            .secure(true);

        assert_eq!(
            cookie.header_value(),
            "palisadeCsrfToken=abc123; Domain=example.org; Path=/; Max-Age=3600; HttpOnly; Secure"
        );
    }

    #[test]
    fn minimal_cookie_is_just_name_and_value() {
        assert_eq!(Cookie::new("k", "v").header_value(), "k=v");
    }
}
