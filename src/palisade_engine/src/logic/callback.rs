//! Completion of an indirect login after the identity provider redirects
//! back.

use std::sync::Arc;

use palisade_core::client::recovered_credentials;
use palisade_core::constants::REQUESTED_URL;
use palisade_core::context::{ResponseAdapter, WebContext};
use palisade_core::domain::flow_action::FlowAction;
use palisade_core::error::{EngineError, EngineResult};
use palisade_core::exec::combinators::with_fallback;
use serde_json::Value;
use tracing::debug;

use crate::clients::finder::CallbackClientFinder;
use crate::config::EngineConfig;
use crate::logic::finish;
use crate::strategies::session_renewal::{AlwaysRenew, SessionRenewalStrategy};

/// Authenticates the one indirect client returning from its round trip,
/// persists the profile, optionally rotates the session id, and sends the
/// caller back to the originally requested URL.
pub struct CallbackLogic {
    client_finder: CallbackClientFinder,
    default_url: String,
    save_in_session: bool,
    multi_profile: bool,
    renewal: Arc<dyn SessionRenewalStrategy>,
}

impl CallbackLogic {
    pub fn new() -> Self {
        Self {
            client_finder: CallbackClientFinder,
            default_url: "/".to_string(),
            save_in_session: true,
            multi_profile: false,
            renewal: Arc::new(AlwaysRenew),
        }
    }

    /// Where to send the caller when no requested URL was saved.
    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }

    pub fn with_save_in_session(mut self, save_in_session: bool) -> Self {
        self.save_in_session = save_in_session;
        self
    }

    pub fn with_multi_profile(mut self, multi_profile: bool) -> Self {
        self.multi_profile = multi_profile;
        self
    }

    pub fn with_session_renewal(mut self, renewal: Arc<dyn SessionRenewalStrategy>) -> Self {
        self.renewal = renewal;
        self
    }

    #[tracing::instrument(name = "CallbackLogic::perform", skip_all)]
    pub async fn perform<A>(
        &self,
        context: &dyn WebContext,
        config: &EngineConfig,
        adapter: &A,
    ) -> A::Output
    where
        A: ResponseAdapter,
    {
        let outcome = match self.execute(context, config).await {
            Ok(action) => Err(EngineError::Flow(action)),
            Err(error) => Err(error),
        };
        finish(context, config, adapter, outcome)
    }

    async fn execute(
        &self,
        context: &dyn WebContext,
        config: &EngineConfig,
    ) -> EngineResult<FlowAction> {
        let client = self.client_finder.find(config.clients(), context)?;
        debug!(client = client.name(), "completing indirect login");

        if let Some(credentials) = recovered_credentials(client.as_ref(), context).await? {
            let profile = match client.user_profile(&credentials, context).await {
                Err(EngineError::Credentials(reason)) => {
                    debug!(%reason, "profile resolution rejected credentials");
                    None
                }
                other => other?,
            };

            if let Some(mut profile) = profile {
                profile.set_client_name(client.name());
                let manager = config.profile_manager(context);
                let saved = manager
                    .save(self.save_in_session, profile, self.multi_profile)
                    .await?;
                if saved {
                    self.renewal.renew(context, config.clients()).await?;
                }
            } else {
                debug!("no profile resolved from the callback");
            }
        } else {
            debug!("no credentials on the callback request");
        }

        let target = self.take_requested_url(context).await?;
        Ok(FlowAction::redirect(target))
    }

    /// Read and clear the saved requested URL, falling back to the
    /// configured default.
    async fn take_requested_url(&self, context: &dyn WebContext) -> EngineResult<String> {
        let store = context.session_store();
        let scheduler = context.scheduler();
        with_fallback(
            scheduler.run_exclusive(async {
                let saved = store
                    .get(REQUESTED_URL)
                    .await?
                    .as_ref()
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .filter(|url| !url.is_empty());
                if saved.is_some() {
                    store.set(REQUESTED_URL, Value::Null).await?;
                }
                Ok(saved)
            }),
            || async { Ok(self.default_url.clone()) },
        )
        .await
    }
}

impl Default for CallbackLogic {
    fn default() -> Self {
        Self::new()
    }
}
