//! A self-contained web context for tests and single-process embeddings.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use palisade_core::context::{Cookie, SessionStore, WebContext};
use palisade_core::exec::scheduler::ContextScheduler;
use serde_json::Value;

use crate::session::{InMemorySessionStore, SessionRegistry};

/// Everything written to the response side of a context.
#[derive(Debug, Clone, Default)]
pub struct RecordedResponse {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<Cookie>,
    pub content: String,
}

/// An in-memory [`WebContext`]: a request description plus a response
/// recorder, backed by an in-memory session store and its own scheduler.
pub struct SimulatedWebContext {
    method: String,
    scheme: String,
    host: String,
    port: u16,
    path: String,
    parameters: Vec<(String, String)>,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    attributes: RwLock<HashMap<String, Value>>,
    response: RwLock<RecordedResponse>,
    session_store: Arc<dyn SessionStore>,
    scheduler: Arc<ContextScheduler>,
}

impl SimulatedWebContext {
    pub fn builder() -> SimulatedWebContextBuilder {
        SimulatedWebContextBuilder::new()
    }

    /// A snapshot of everything written to the response so far.
    pub fn recorded_response(&self) -> RecordedResponse {
        self.response.read().expect("response lock poisoned").clone()
    }
}

pub struct SimulatedWebContextBuilder {
    method: String,
    scheme: String,
    host: String,
    port: u16,
    path: String,
    parameters: Vec<(String, String)>,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    session_store: Option<Arc<dyn SessionStore>>,
}

impl SimulatedWebContextBuilder {
    fn new() -> Self {
        Self {
            method: "GET".to_string(),
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 8080,
            path: "/".to_string(),
            parameters: Vec::new(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            session_store: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Share a session store across contexts, as consecutive requests of
    /// one browser session do.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn build(self) -> SimulatedWebContext {
        let session_store = self
            .session_store
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new(SessionRegistry::new())));
        SimulatedWebContext {
            method: self.method,
            scheme: self.scheme,
            host: self.host,
            port: self.port,
            path: self.path,
            parameters: self.parameters,
            headers: self.headers,
            cookies: self.cookies,
            attributes: RwLock::new(HashMap::new()),
            response: RwLock::new(RecordedResponse::default()),
            session_store,
            scheduler: Arc::new(ContextScheduler::new()),
        }
    }
}

impl WebContext for SimulatedWebContext {
    fn request_parameter(&self, name: &str) -> Option<String> {
        self.parameters
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn request_header(&self, name: &str) -> Option<String> {
        self.headers.get(&name.to_ascii_lowercase()).cloned()
    }

    fn request_method(&self) -> String {
        self.method.clone()
    }

    fn scheme(&self) -> String {
        self.scheme.clone()
    }

    fn server_name(&self) -> String {
        self.host.clone()
    }

    fn server_port(&self) -> u16 {
        self.port
    }

    fn path(&self) -> String {
        self.path.clone()
    }

    fn full_request_url(&self) -> String {
        let default_port = match self.scheme.as_str() {
            "https" => 443,
            _ => 80,
        };
        let mut url = if self.port == default_port {
            format!("{}://{}{}", self.scheme, self.host, self.path)
        } else {
            format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
        };
        if !self.parameters.is_empty() {
            let query: Vec<String> = self
                .parameters
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }

    fn request_attribute(&self, name: &str) -> Option<Value> {
        self.attributes
            .read()
            .expect("attribute lock poisoned")
            .get(name)
            .filter(|value| !value.is_null())
            .cloned()
    }

    fn set_request_attribute(&self, name: &str, value: Value) {
        let mut attributes = self.attributes.write().expect("attribute lock poisoned");
        if value.is_null() {
            attributes.remove(name);
        } else {
            attributes.insert(name.to_string(), value);
        }
    }

    fn request_cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn set_response_cookie(&self, cookie: Cookie) {
        self.response
            .write()
            .expect("response lock poisoned")
            .cookies
            .push(cookie);
    }

    fn set_response_header(&self, name: &str, value: &str) {
        self.response
            .write()
            .expect("response lock poisoned")
            .headers
            .push((name.to_string(), value.to_string()));
    }

    fn set_response_status(&self, code: u16) {
        self.response.write().expect("response lock poisoned").status = Some(code);
    }

    fn write_response_content(&self, content: &str) {
        self.response
            .write()
            .expect("response lock poisoned")
            .content
            .push_str(content);
    }

    fn session_store(&self) -> Arc<dyn SessionStore> {
        self.session_store.clone()
    }

    fn scheduler(&self) -> Arc<ContextScheduler> {
        self.scheduler.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accessors_reflect_the_builder() {
        let ctx = SimulatedWebContext::builder()
            .method("post")
            .scheme("https")
            .host("app.example.org")
            .port(443)
            .path("/login")
            .parameter("client_name", "oidc")
            .header("X-Custom", "value")
            .cookie("session", "abc")
            .build();

        assert_eq!(ctx.request_method(), "post");
        assert_eq!(ctx.request_parameter("client_name").as_deref(), Some("oidc"));
        assert_eq!(ctx.request_parameter("missing"), None);
        // Header lookup is case-insensitive.
        assert_eq!(ctx.request_header("x-custom").as_deref(), Some("value"));
        assert_eq!(ctx.request_cookie("session").as_deref(), Some("abc"));
        assert!(ctx.is_secure());
    }

    #[test]
    fn full_url_hides_default_ports_and_keeps_the_query() {
        let ctx = SimulatedWebContext::builder()
            .scheme("https")
            .host("app.example.org")
            .port(443)
            .path("/protected")
            .parameter("a", "1")
            .parameter("b", "2")
            .build();
        assert_eq!(
            ctx.full_request_url(),
            "https://app.example.org/protected?a=1&b=2"
        );

        let ctx = SimulatedWebContext::builder()
            .host("localhost")
            .port(8080)
            .path("/")
            .build();
        assert_eq!(ctx.full_request_url(), "http://localhost:8080/");
    }

    #[test]
    fn attributes_treat_null_as_removal() {
        let ctx = SimulatedWebContext::builder().build();

        ctx.set_request_attribute("k", Value::String("v".into()));
        assert!(ctx.request_attribute("k").is_some());

        ctx.set_request_attribute("k", Value::Null);
        assert!(ctx.request_attribute("k").is_none());
    }

    #[test]
    fn response_recorder_captures_writes() {
        let ctx = SimulatedWebContext::builder().build();

        ctx.set_response_status(302);
        ctx.set_response_header("Location", "/elsewhere");
        ctx.set_response_cookie(Cookie::new("k", "v"));
        ctx.write_response_content("moved");

        let response = ctx.recorded_response();
        assert_eq!(response.status, Some(302));
        assert_eq!(
            response.headers,
            vec![("Location".to_string(), "/elsewhere".to_string())]
        );
        assert_eq!(response.cookies.len(), 1);
        assert_eq!(response.content, "moved");
    }
}
