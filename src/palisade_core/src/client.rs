//! The client contract: one authentication mechanism.
//!
//! A client is either direct (credentials already travel on the request) or
//! indirect (the caller must first be redirected to a third party). The
//! distinction is a capability flag, not a type hierarchy: direct clients
//! keep the default [`Client::redirect_action`], which rejects the call.

use async_trait::async_trait;
use tracing::debug;

use crate::context::WebContext;
use crate::domain::credentials::Credentials;
use crate::domain::flow_action::FlowAction;
use crate::domain::profile::UserProfile;
use crate::error::{EngineError, EngineResult};

/// The registry-level settings handed to each client during two-phase
/// initialization.
#[derive(Debug, Clone, Default)]
pub struct ClientsView {
    /// Where indirect clients send the identity provider back to.
    pub callback_url: Option<String>,
    /// Name of the request parameter carrying the targeted client name.
    pub client_name_parameter: String,
}

#[async_trait]
pub trait Client: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this mechanism needs a redirect round trip to authenticate.
    fn is_indirect(&self) -> bool;

    /// Called exactly once by the registry after construction, before the
    /// client is used.
    fn configure(&mut self, _view: &ClientsView) -> EngineResult<()> {
        Ok(())
    }

    /// Extract credentials from the request. Absence is a normal outcome.
    async fn credentials(&self, context: &dyn WebContext) -> EngineResult<Option<Credentials>>;

    /// Resolve a profile from previously extracted credentials. Never
    /// called when credentials were absent.
    async fn user_profile(
        &self,
        credentials: &Credentials,
        context: &dyn WebContext,
    ) -> EngineResult<Option<UserProfile>>;

    /// The redirect starting this client's login round trip. Indirect
    /// clients must override; direct clients must keep the default.
    async fn redirect_action(&self, _context: &dyn WebContext) -> EngineResult<FlowAction> {
        Err(EngineError::Configuration(format!(
            "client '{}' does not support redirects",
            self.name()
        )))
    }

    /// A federated logout action against `target_url`, when this client
    /// has one. `target_url` is only passed when absolute http(s).
    async fn logout_action(
        &self,
        _context: &dyn WebContext,
        _profile: &UserProfile,
        _target_url: Option<&str>,
    ) -> EngineResult<Option<FlowAction>> {
        Ok(None)
    }

    /// Notification that the session id rotated, so the client can migrate
    /// any session-correlated state it holds.
    async fn on_session_renewal(
        &self,
        _old_id: &str,
        _new_id: &str,
        _context: &dyn WebContext,
    ) -> EngineResult<()> {
        Ok(())
    }
}

/// Extract credentials, treating a credentials rejection as absence.
///
/// Validation failures are invisible to callers: the flow continues as if
/// the request carried no credentials at all. Every other error still
/// propagates.
pub async fn recovered_credentials(
    client: &dyn Client,
    context: &dyn WebContext,
) -> EngineResult<Option<Credentials>> {
    match client.credentials(context).await {
        Err(EngineError::Credentials(reason)) => {
            debug!(client = client.name(), %reason, "credentials rejected, continuing unauthenticated");
            Ok(None)
        }
        other => other,
    }
}
