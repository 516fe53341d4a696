//! Reusable client building blocks.
//!
//! Profile resolution is delegated to a [`CredentialsResolver`]: the piece
//! an embedding supplies to validate extracted credentials against its own
//! user store or identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use palisade_core::client::{Client, ClientsView};
use palisade_core::context::WebContext;
use palisade_core::domain::credentials::Credentials;
use palisade_core::domain::flow_action::FlowAction;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::{EngineError, EngineResult};

/// Validates credentials and resolves the matching profile.
///
/// Rejecting the credentials is signalled with
/// [`EngineError::Credentials`]; the engine recovers it as "not
/// authenticated". `Ok(None)` means the credentials were acceptable but
/// matched nobody.
#[async_trait]
pub trait CredentialsResolver: Send + Sync {
    async fn resolve(
        &self,
        credentials: &Credentials,
        context: &dyn WebContext,
    ) -> EngineResult<Option<UserProfile>>;
}

/// A resolver backed by a plain function, for tests and simple embeddings.
pub struct FnCredentialsResolver<F>(pub F)
where
    F: Fn(&Credentials) -> EngineResult<Option<UserProfile>> + Send + Sync;

#[async_trait]
impl<F> CredentialsResolver for FnCredentialsResolver<F>
where
    F: Fn(&Credentials) -> EngineResult<Option<UserProfile>> + Send + Sync,
{
    async fn resolve(
        &self,
        credentials: &Credentials,
        _context: &dyn WebContext,
    ) -> EngineResult<Option<UserProfile>> {
        (self.0)(credentials)
    }
}

/// Direct client reading a token from a request header, optionally behind
/// a fixed prefix (e.g. `Authorization: Bearer <token>`).
pub struct DirectHeaderClient {
    name: String,
    header_name: String,
    prefix: String,
    resolver: Arc<dyn CredentialsResolver>,
}

impl DirectHeaderClient {
    pub fn new(
        name: impl Into<String>,
        header_name: impl Into<String>,
        resolver: Arc<dyn CredentialsResolver>,
    ) -> Self {
        Self {
            name: name.into(),
            header_name: header_name.into(),
            prefix: String::new(),
            resolver,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

#[async_trait]
impl Client for DirectHeaderClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_indirect(&self) -> bool {
        false
    }

    async fn credentials(&self, context: &dyn WebContext) -> EngineResult<Option<Credentials>> {
        let Some(value) = context.request_header(&self.header_name) else {
            return Ok(None);
        };
        if self.prefix.is_empty() {
            return Ok(Some(Credentials::token(value)));
        }
        match value.strip_prefix(&self.prefix) {
            Some(token) => Ok(Some(Credentials::token(token))),
            // A present header with the wrong shape is a rejection, not
            // an absence.
            None => Err(EngineError::Credentials(format!(
                "header '{}' does not start with the expected prefix",
                self.header_name
            ))),
        }
    }

    async fn user_profile(
        &self,
        credentials: &Credentials,
        context: &dyn WebContext,
    ) -> EngineResult<Option<UserProfile>> {
        self.resolver.resolve(credentials, context).await
    }
}

/// Direct client reading a token from a query/form parameter.
pub struct DirectParameterClient {
    name: String,
    parameter_name: String,
    resolver: Arc<dyn CredentialsResolver>,
}

impl DirectParameterClient {
    pub fn new(
        name: impl Into<String>,
        parameter_name: impl Into<String>,
        resolver: Arc<dyn CredentialsResolver>,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_name: parameter_name.into(),
            resolver,
        }
    }
}

#[async_trait]
impl Client for DirectParameterClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_indirect(&self) -> bool {
        false
    }

    async fn credentials(&self, context: &dyn WebContext) -> EngineResult<Option<Credentials>> {
        Ok(context
            .request_parameter(&self.parameter_name)
            .map(Credentials::token))
    }

    async fn user_profile(
        &self,
        credentials: &Credentials,
        context: &dyn WebContext,
    ) -> EngineResult<Option<UserProfile>> {
        self.resolver.resolve(credentials, context).await
    }
}

/// Indirect client delegating login to an external page.
///
/// The redirect sends the caller to `login_url` with the callback URL
/// attached; on the way back the opaque token parameter is extracted and
/// handed to the resolver. Provider-specific token exchange lives inside
/// the resolver an embedding supplies.
pub struct RedirectLoginClient {
    name: String,
    login_url: String,
    token_parameter: String,
    central_logout_url: Option<String>,
    resolver: Arc<dyn CredentialsResolver>,
    callback_url: Option<String>,
}

impl RedirectLoginClient {
    pub fn new(
        name: impl Into<String>,
        login_url: impl Into<String>,
        resolver: Arc<dyn CredentialsResolver>,
    ) -> Self {
        Self {
            name: name.into(),
            login_url: login_url.into(),
            token_parameter: "token".to_string(),
            central_logout_url: None,
            resolver,
            callback_url: None,
        }
    }

    pub fn with_token_parameter(mut self, name: impl Into<String>) -> Self {
        self.token_parameter = name.into();
        self
    }

    /// The identity provider's federated logout endpoint.
    pub fn with_central_logout_url(mut self, url: impl Into<String>) -> Self {
        self.central_logout_url = Some(url.into());
        self
    }

    fn append_parameter(url: &str, name: &str, value: &str) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}{name}={value}")
    }
}

#[async_trait]
impl Client for RedirectLoginClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_indirect(&self) -> bool {
        true
    }

    fn configure(&mut self, view: &ClientsView) -> EngineResult<()> {
        let callback_url = view.callback_url.as_deref().ok_or_else(|| {
            EngineError::Configuration(format!(
                "indirect client '{}' requires a callback url",
                self.name
            ))
        })?;
        self.callback_url = Some(Self::append_parameter(
            callback_url,
            &view.client_name_parameter,
            &self.name,
        ));
        Ok(())
    }

    async fn credentials(&self, context: &dyn WebContext) -> EngineResult<Option<Credentials>> {
        Ok(context
            .request_parameter(&self.token_parameter)
            .map(Credentials::token))
    }

    async fn user_profile(
        &self,
        credentials: &Credentials,
        context: &dyn WebContext,
    ) -> EngineResult<Option<UserProfile>> {
        self.resolver.resolve(credentials, context).await
    }

    async fn redirect_action(&self, _context: &dyn WebContext) -> EngineResult<FlowAction> {
        let callback_url = self.callback_url.as_deref().ok_or_else(|| {
            EngineError::Configuration(format!("client '{}' was never configured", self.name))
        })?;
        let location = Self::append_parameter(&self.login_url, "callback", callback_url);
        Ok(FlowAction::redirect(location))
    }

    async fn logout_action(
        &self,
        _context: &dyn WebContext,
        _profile: &UserProfile,
        target_url: Option<&str>,
    ) -> EngineResult<Option<FlowAction>> {
        let Some(logout_url) = self.central_logout_url.as_deref() else {
            return Ok(None);
        };
        let location = match target_url {
            Some(target) => Self::append_parameter(logout_url, "post_logout", target),
            None => logout_url.to_string(),
        };
        Ok(Some(FlowAction::redirect(location)))
    }
}

/// A client that authenticates every request as the anonymous identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousClient;

#[async_trait]
impl Client for AnonymousClient {
    fn name(&self) -> &str {
        "anonymous"
    }

    fn is_indirect(&self) -> bool {
        false
    }

    async fn credentials(&self, _context: &dyn WebContext) -> EngineResult<Option<Credentials>> {
        Ok(Some(Credentials::Anonymous))
    }

    async fn user_profile(
        &self,
        _credentials: &Credentials,
        _context: &dyn WebContext,
    ) -> EngineResult<Option<UserProfile>> {
        Ok(Some(UserProfile::anonymous()))
    }
}

#[cfg(test)]
mod tests {
    use crate::context::SimulatedWebContext;

    use super::*;

    fn token_resolver(expected: &'static str) -> Arc<dyn CredentialsResolver> {
        Arc::new(FnCredentialsResolver(move |credentials: &Credentials| {
            match credentials.expose_token() {
                Some(token) if token == expected => Ok(Some(UserProfile::new("u1"))),
                Some(_) => Err(EngineError::Credentials("unknown token".into())),
                None => Ok(None),
            }
        }))
    }

    #[tokio::test]
    async fn header_client_strips_the_prefix() {
        let client = DirectHeaderClient::new("bearer", "Authorization", token_resolver("tok"))
            .with_prefix("Bearer ");

        let ctx = SimulatedWebContext::builder()
            .header("Authorization", "Bearer tok")
            .build();
        let credentials = client.credentials(&ctx).await.unwrap().unwrap();
        assert_eq!(credentials.expose_token(), Some("tok"));

        let profile = client.user_profile(&credentials, &ctx).await.unwrap();
        assert_eq!(profile.unwrap().id(), "u1");
    }

    #[tokio::test]
    async fn header_client_rejects_a_malformed_header() {
        let client = DirectHeaderClient::new("bearer", "Authorization", token_resolver("tok"))
            .with_prefix("Bearer ");

        let ctx = SimulatedWebContext::builder()
            .header("Authorization", "Basic dXNlcg==")
            .build();
        let result = client.credentials(&ctx).await;
        assert!(matches!(result, Err(EngineError::Credentials(_))));
    }

    #[tokio::test]
    async fn header_client_reads_absence_as_none() {
        let client = DirectHeaderClient::new("bearer", "Authorization", token_resolver("tok"));
        let ctx = SimulatedWebContext::builder().build();
        assert!(client.credentials(&ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn parameter_client_reads_the_parameter() {
        let client = DirectParameterClient::new("api", "api_key", token_resolver("k1"));

        let ctx = SimulatedWebContext::builder().parameter("api_key", "k1").build();
        let credentials = client.credentials(&ctx).await.unwrap().unwrap();
        assert_eq!(credentials.expose_token(), Some("k1"));
    }

    #[tokio::test]
    async fn redirect_client_builds_the_login_redirect() {
        let mut client = RedirectLoginClient::new(
            "oidc",
            "https://idp.example.org/authorize",
            token_resolver("tok"),
        );
        client
            .configure(&ClientsView {
                callback_url: Some("https://app.example.org/callback".into()),
                client_name_parameter: "client_name".into(),
            })
            .unwrap();

        let ctx = SimulatedWebContext::builder().build();
        let action = client.redirect_action(&ctx).await.unwrap();
        assert_eq!(
            action.location(),
            Some(
                "https://idp.example.org/authorize?callback=https://app.example.org/callback?client_name=oidc"
            )
        );
    }

    #[tokio::test]
    async fn redirect_client_requires_a_callback_url() {
        let mut client = RedirectLoginClient::new(
            "oidc",
            "https://idp.example.org/authorize",
            token_resolver("tok"),
        );
        let result = client.configure(&ClientsView::default());
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[tokio::test]
    async fn redirect_client_federated_logout_appends_the_target() {
        let client = RedirectLoginClient::new(
            "oidc",
            "https://idp.example.org/authorize",
            token_resolver("tok"),
        )
        .with_central_logout_url("https://idp.example.org/logout");

        let ctx = SimulatedWebContext::builder().build();
        let profile = UserProfile::new("u1").with_client_name("oidc");

        let action = client
            .logout_action(&ctx, &profile, Some("https://app.example.org/"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            action.location(),
            Some("https://idp.example.org/logout?post_logout=https://app.example.org/")
        );

        let action = client.logout_action(&ctx, &profile, None).await.unwrap().unwrap();
        assert_eq!(action.location(), Some("https://idp.example.org/logout"));
    }

    #[tokio::test]
    async fn anonymous_client_always_resolves_the_anonymous_profile() {
        let client = AnonymousClient;
        let ctx = SimulatedWebContext::builder().build();

        let credentials = client.credentials(&ctx).await.unwrap().unwrap();
        assert!(credentials.is_anonymous());

        let profile = client.user_profile(&credentials, &ctx).await.unwrap().unwrap();
        assert!(profile.is_anonymous());
    }
}
