//! The per-request access-control state machine.

use std::future::Future;

use palisade_core::context::{ResponseAdapter, WebContext};
use palisade_core::domain::flow_action::FlowAction;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::{EngineError, EngineResult};
use tracing::debug;

use crate::clients::finder::SecurityClientFinder;
use crate::config::EngineConfig;
use crate::logic::authenticators::{AuthenticationFallback, DirectClientAuthenticator};
use crate::logic::finish;
use crate::matching::checker::MatchingChecker;
use crate::authorization::checker::AuthorizationChecker;

/// Orchestrates one protected request.
///
/// The request first passes the matching gate (a non-match grants access
/// outright), then the applicable clients are resolved, existing profiles
/// loaded, direct authentication attempted when none exist, and finally
/// the named authorizers evaluated. Every terminal outcome (the granted
/// callback's result, a flow action, or a failure) passes through the
/// configured error seam before being adapted to a response.
pub struct SecurityLogic {
    client_finder: SecurityClientFinder,
    matching_checker: MatchingChecker,
    authorization_checker: AuthorizationChecker,
    direct_authenticator: DirectClientAuthenticator,
    fallback: AuthenticationFallback,
    multi_profile: bool,
}

impl SecurityLogic {
    pub fn new() -> Self {
        Self {
            client_finder: SecurityClientFinder,
            matching_checker: MatchingChecker,
            authorization_checker: AuthorizationChecker::new(),
            direct_authenticator: DirectClientAuthenticator::default(),
            fallback: AuthenticationFallback,
            multi_profile: false,
        }
    }

    /// Keep one profile per client instead of replacing the store on save.
    pub fn with_multi_profile(mut self, multi_profile: bool) -> Self {
        self.multi_profile = multi_profile;
        self
    }

    pub fn with_direct_authenticator(mut self, authenticator: DirectClientAuthenticator) -> Self {
        self.direct_authenticator = authenticator;
        self
    }

    /// Run the state machine for one request.
    ///
    /// `access_granted` is invoked exactly once when the request passes
    /// all gates (with the established profiles, empty on a matcher
    /// bypass); otherwise the terminal flow action is adapted instead.
    #[tracing::instrument(
        name = "SecurityLogic::perform",
        skip_all,
        fields(clients = client_names.unwrap_or_default())
    )]
    pub async fn perform<A, G, Fut>(
        &self,
        context: &dyn WebContext,
        config: &EngineConfig,
        access_granted: G,
        adapter: &A,
        client_names: Option<&str>,
        authorizer_names: Option<&str>,
        matcher_names: Option<&str>,
    ) -> A::Output
    where
        A: ResponseAdapter,
        G: FnOnce(Vec<UserProfile>) -> Fut,
        Fut: Future<Output = EngineResult<A::Output>>,
    {
        let outcome = self
            .execute(
                context,
                config,
                access_granted,
                client_names,
                authorizer_names,
                matcher_names,
            )
            .await;
        finish(context, config, adapter, outcome)
    }

    async fn execute<G, Fut, O>(
        &self,
        context: &dyn WebContext,
        config: &EngineConfig,
        access_granted: G,
        client_names: Option<&str>,
        authorizer_names: Option<&str>,
        matcher_names: Option<&str>,
    ) -> EngineResult<O>
    where
        G: FnOnce(Vec<UserProfile>) -> Fut,
        Fut: Future<Output = EngineResult<O>>,
    {
        if !self
            .matching_checker
            .matches(context, matcher_names, config.matchers())
            .await?
        {
            debug!("request excluded by matchers, granting access");
            return access_granted(Vec::new()).await;
        }

        let resolved = self
            .client_finder
            .find(config.clients(), context, client_names)?;
        debug!(count = resolved.len(), "clients resolved");

        // Session-backed state only matters when an indirect client may
        // have established a profile earlier (or no client narrows it).
        let read_from_session =
            resolved.is_empty() || resolved.iter().any(|client| client.is_indirect());

        let manager = config.profile_manager(context);
        let mut profiles = manager.get_all(read_from_session).await?;

        if profiles.is_empty() {
            let direct: Vec<_> = resolved
                .iter()
                .filter(|client| !client.is_indirect())
                .cloned()
                .collect();
            if !direct.is_empty() {
                profiles = self
                    .direct_authenticator
                    .authenticate(context, &manager, &direct, read_from_session, self.multi_profile)
                    .await?;
            }
        }

        if profiles.is_empty() {
            let action = self.fallback.handle(context, &resolved).await?;
            return Err(EngineError::Flow(action));
        }

        debug!(count = profiles.len(), "profiles established, authorizing");
        let authorized = self
            .authorization_checker
            .is_authorized(context, &profiles, authorizer_names, config.authorizers())
            .await?;
        if !authorized {
            return Err(EngineError::Flow(FlowAction::Forbidden));
        }

        access_granted(profiles).await
    }
}

impl Default for SecurityLogic {
    fn default() -> Self {
        Self::new()
    }
}
