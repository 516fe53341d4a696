//! CSRF token issuance and verification.
//!
//! One shared name is used for the session key, the request parameter, the
//! request header, the request attribute and the cookie.

use async_trait::async_trait;
use palisade_core::constants::CSRF_TOKEN;
use palisade_core::context::{Cookie, WebContext};
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::EngineResult;
use serde_json::Value;
use uuid::Uuid;

use crate::authorization::Authorizer;

/// Session-backed get-or-create token generation.
///
/// The first write wins: once a token is persisted, every caller observes
/// that same token. The read-check-write sequence runs under the context's
/// exclusive-mutation scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfTokenGenerator;

impl CsrfTokenGenerator {
    pub async fn get(&self, context: &dyn WebContext) -> EngineResult<String> {
        let store = context.session_store();
        let scheduler = context.scheduler();
        scheduler
            .run_exclusive(async move {
                if let Some(existing) = store
                    .get(CSRF_TOKEN)
                    .await?
                    .as_ref()
                    .and_then(Value::as_str)
                {
                    return Ok(existing.to_string());
                }
                let token = Uuid::new_v4().to_string();
                store.set(CSRF_TOKEN, Value::String(token.clone())).await?;
                Ok(token)
            })
            .await
    }
}

/// Verifies the request token against the session-stored token.
///
/// Only mutating (POST-class) requests are checked unless
/// `check_all_requests` is set. The token may travel as a request
/// parameter or as a request header.
pub struct CsrfAuthorizer {
    check_all_requests: bool,
}

impl CsrfAuthorizer {
    pub fn new(check_all_requests: bool) -> Self {
        Self { check_all_requests }
    }
}

impl Default for CsrfAuthorizer {
    fn default() -> Self {
        Self::new(false)
    }
}

#[async_trait]
impl Authorizer for CsrfAuthorizer {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        let method = context.request_method().to_ascii_uppercase();
        let mutating = matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
        if !self.check_all_requests && !mutating {
            return Ok(true);
        }

        let stored = context.session_store().get(CSRF_TOKEN).await?;
        let Some(stored) = stored.as_ref().and_then(Value::as_str) else {
            return Ok(false);
        };

        let parameter = context.request_parameter(CSRF_TOKEN);
        let header = context.request_header(CSRF_TOKEN);
        Ok(parameter.as_deref() == Some(stored) || header.as_deref() == Some(stored))
    }
}

/// Issues the token to the caller: as a request attribute and as a cookie.
pub struct CsrfTokenGeneratorAuthorizer {
    generator: CsrfTokenGenerator,
    domain: Option<String>,
    path: String,
    http_only: bool,
    secure: bool,
}

impl CsrfTokenGeneratorAuthorizer {
    pub fn new() -> Self {
        Self {
            generator: CsrfTokenGenerator,
            domain: None,
            path: "/".to_string(),
            http_only: false,
            secure: false,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
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
}

impl Default for CsrfTokenGeneratorAuthorizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authorizer for CsrfTokenGeneratorAuthorizer {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        let token = self.generator.get(context).await?;

        context.set_request_attribute(CSRF_TOKEN, Value::String(token.clone()));

        let domain = self
            .domain
            .clone()
            .unwrap_or_else(|| context.server_name());
        let cookie = Cookie::new(CSRF_TOKEN, token)
            .with_domain(domain)
            .with_path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure);
        context.set_response_cookie(cookie);

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use palisade_adapters::context::SimulatedWebContext;
    use palisade_core::context::WebContext as _;

    use super::*;

    #[tokio::test]
    async fn token_generation_is_idempotent_per_session() {
        let ctx = SimulatedWebContext::builder().build();
        let generator = CsrfTokenGenerator;

        let first = generator.get(&ctx).await.unwrap();
        let second = generator.get(&ctx).await.unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn non_mutating_requests_are_not_checked() {
        let ctx = SimulatedWebContext::builder().method("GET").build();
        let authorized = CsrfAuthorizer::default()
            .is_authorized(&ctx, &[])
            .await
            .unwrap();
        assert!(authorized);
    }

    #[tokio::test]
    async fn post_requires_a_matching_token() {
        let ctx = SimulatedWebContext::builder().method("POST").build();
        ctx.session_store()
            .set(CSRF_TOKEN, Value::String("tok".into()))
            .await
            .unwrap();

        // No token on the request.
        assert!(
            !CsrfAuthorizer::default()
                .is_authorized(&ctx, &[])
                .await
                .unwrap()
        );

        // Token as a parameter.
        let ctx = SimulatedWebContext::builder()
            .method("POST")
            .parameter(CSRF_TOKEN, "tok")
            .build();
        ctx.session_store()
            .set(CSRF_TOKEN, Value::String("tok".into()))
            .await
            .unwrap();
        assert!(
            CsrfAuthorizer::default()
                .is_authorized(&ctx, &[])
                .await
                .unwrap()
        );

        // Token as a header.
        let ctx = SimulatedWebContext::builder()
            .method("POST")
            .header(CSRF_TOKEN, "tok")
            .build();
        ctx.session_store()
            .set(CSRF_TOKEN, Value::String("tok".into()))
            .await
            .unwrap();
        assert!(
            CsrfAuthorizer::default()
                .is_authorized(&ctx, &[])
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn check_all_requests_also_covers_get() {
        let ctx = SimulatedWebContext::builder().method("GET").build();
        ctx.session_store()
            .set(CSRF_TOKEN, Value::String("tok".into()))
            .await
            .unwrap();
        assert!(
            !CsrfAuthorizer::new(true)
                .is_authorized(&ctx, &[])
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn generator_authorizer_issues_attribute_and_cookie() {
        let ctx = SimulatedWebContext::builder().host("app.example.org").build();

        let authorized = CsrfTokenGeneratorAuthorizer::new()
            .http_only(true)
            .is_authorized(&ctx, &[])
            .await
            .unwrap();
        assert!(authorized);

        let token = ctx
            .request_attribute(CSRF_TOKEN)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap();

        let response = ctx.recorded_response();
        let cookie = response
            .cookies
            .iter()
            .find(|c| c.name == CSRF_TOKEN)
            .unwrap();
        assert_eq!(cookie.value, token);
        assert_eq!(cookie.domain.as_deref(), Some("app.example.org"));
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert!(cookie.http_only);
    }
}
