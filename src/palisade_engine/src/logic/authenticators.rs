//! Direct-credential authentication and the fallback when it yields
//! nothing.

use std::sync::Arc;

use palisade_core::client::{Client, recovered_credentials};
use palisade_core::constants::REQUESTED_URL;
use palisade_core::context::WebContext;
use palisade_core::domain::flow_action::FlowAction;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::{EngineError, EngineResult};
use palisade_core::exec::combinators::join_ordered;
use serde_json::Value;
use tracing::debug;

use crate::profile_manager::ProfileManager;
use crate::strategies::save::{
    AllSavesSucceed, SaveAggregation, SaveToSessionPolicy, session_saves_for_indirect_only,
};

/// Runs every direct client against the request and persists what they
/// resolve.
///
/// Credential and profile resolution run once per client with no ordering
/// across clients; the results are joined in declaration order before the
/// deferred saves execute, so the store always reflects the configured
/// client order regardless of which resolution finished first.
pub struct DirectClientAuthenticator {
    save_to_session: SaveToSessionPolicy,
    aggregation: Arc<dyn SaveAggregation>,
}

impl DirectClientAuthenticator {
    pub fn new(save_to_session: SaveToSessionPolicy, aggregation: Arc<dyn SaveAggregation>) -> Self {
        Self {
            save_to_session,
            aggregation,
        }
    }

    pub async fn authenticate(
        &self,
        context: &dyn WebContext,
        manager: &ProfileManager<'_>,
        clients: &[Arc<dyn Client>],
        read_from_session: bool,
        multi_profile: bool,
    ) -> EngineResult<Vec<UserProfile>> {
        if clients.is_empty() {
            return Ok(Vec::new());
        }

        let resolutions = clients
            .iter()
            .map(|client| {
                let client = client.clone();
                async move { resolve_profile(client.as_ref(), context).await }
            })
            .collect::<Vec<_>>();
        let resolved = join_ordered(resolutions).await?;

        let mut results = Vec::with_capacity(resolved.len());
        for (client, profile) in clients.iter().zip(resolved) {
            match profile {
                Some(profile) => {
                    let save_in_session = (self.save_to_session)(context, client.as_ref());
                    results.push(manager.save(save_in_session, profile, multi_profile).await?);
                }
                None => results.push(false),
            }
        }

        if self.aggregation.combine(results).await? {
            manager.get_all(read_from_session).await
        } else {
            Ok(Vec::new())
        }
    }
}

impl Default for DirectClientAuthenticator {
    fn default() -> Self {
        Self::new(session_saves_for_indirect_only(), Arc::new(AllSavesSucceed))
    }
}

/// One client's credential → profile pipeline. Strictly sequential within
/// the client; rejected credentials read as absence at both steps.
async fn resolve_profile(
    client: &dyn Client,
    context: &dyn WebContext,
) -> EngineResult<Option<UserProfile>> {
    let Some(credentials) = recovered_credentials(client, context).await? else {
        return Ok(None);
    };
    let profile = match client.user_profile(&credentials, context).await {
        Err(EngineError::Credentials(reason)) => {
            debug!(client = client.name(), %reason, "profile resolution rejected credentials");
            None
        }
        other => other?,
    };
    Ok(profile.map(|mut profile| {
        profile.set_client_name(client.name());
        profile
    }))
}

/// Decides what happens when no profile could be established: start the
/// first client's indirect round trip, or deny.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticationFallback;

impl AuthenticationFallback {
    pub async fn handle(
        &self,
        context: &dyn WebContext,
        clients: &[Arc<dyn Client>],
    ) -> EngineResult<FlowAction> {
        if let Some(first) = clients.first() {
            if first.is_indirect() {
                debug!(client = first.name(), "starting indirect login");
                save_requested_url(context).await?;
                return first.redirect_action(context).await;
            }
        }
        Ok(FlowAction::Unauthorized)
    }
}

/// Remember where the caller wanted to go, for the post-callback redirect.
async fn save_requested_url(context: &dyn WebContext) -> EngineResult<()> {
    let url = context.full_request_url();
    debug!(%url, "saving requested url");
    context
        .session_store()
        .set(REQUESTED_URL, Value::String(url))
        .await
}
