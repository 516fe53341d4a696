//! Cross-origin request allowance.

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::EngineResult;

use crate::authorization::Authorizer;

/// Writes CORS response headers and always authorizes.
pub struct CorsAuthorizer {
    allow_origin: String,
    allow_credentials: bool,
    allow_methods: Option<String>,
    allow_headers: Option<String>,
    expose_headers: Option<String>,
    max_age_seconds: Option<u32>,
}

impl CorsAuthorizer {
    /// The permissive configuration behind `allowAjaxRequests`.
    pub fn allow_all() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_credentials: true,
            allow_methods: None,
            allow_headers: None,
            expose_headers: None,
            max_age_seconds: None,
        }
    }

    pub fn with_allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allow_origin = origin.into();
        self
    }

    pub fn with_allow_methods(mut self, methods: impl Into<String>) -> Self {
        self.allow_methods = Some(methods.into());
        self
    }

    pub fn with_allow_headers(mut self, headers: impl Into<String>) -> Self {
        self.allow_headers = Some(headers.into());
        self
    }

    pub fn with_expose_headers(mut self, headers: impl Into<String>) -> Self {
        self.expose_headers = Some(headers.into());
        self
    }

    pub fn with_max_age(mut self, seconds: u32) -> Self {
        self.max_age_seconds = Some(seconds);
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }
}

impl Default for CorsAuthorizer {
    fn default() -> Self {
        Self::allow_all()
    }
}

#[async_trait]
impl Authorizer for CorsAuthorizer {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        context.set_response_header("Access-Control-Allow-Origin", &self.allow_origin);
        if self.allow_credentials {
            context.set_response_header("Access-Control-Allow-Credentials", "true");
        }
        if let Some(methods) = &self.allow_methods {
            context.set_response_header("Access-Control-Allow-Methods", methods);
        }
        if let Some(headers) = &self.allow_headers {
            context.set_response_header("Access-Control-Allow-Headers", headers);
        }
        if let Some(headers) = &self.expose_headers {
            context.set_response_header("Access-Control-Expose-Headers", headers);
        }
        if let Some(max_age) = self.max_age_seconds {
            context.set_response_header("Access-Control-Max-Age", &max_age.to_string());
        }
        Ok(true)
    }
}
