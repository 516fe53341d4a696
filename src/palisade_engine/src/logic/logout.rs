//! Logout orchestration: local state clearing plus optional federated
//! logout.

use std::sync::Arc;

use palisade_core::constants::{DEFAULT_LOGOUT_URL_PATTERN, LOGOUT_URL_PARAMETER};
use palisade_core::context::{ResponseAdapter, WebContext};
use palisade_core::domain::flow_action::FlowAction;
use palisade_core::error::{EngineError, EngineResult};
use regex::Regex;
use tracing::debug;

use crate::config::EngineConfig;
use crate::logic::finish;
use crate::strategies::logout::{
    AlwaysLogout, CentralLogoutStrategy, LocalLogoutStrategy, NoCentralLogout,
};

/// Clears local profile/session state per the local strategy, then asks
/// the central strategy for a federated logout action. The response is
/// that action, a redirect to the computed target, or a plain ok.
pub struct LogoutLogic {
    default_url: Option<String>,
    logout_url_pattern: Regex,
    local: Arc<dyn LocalLogoutStrategy>,
    central: Arc<dyn CentralLogoutStrategy>,
}

impl LogoutLogic {
    pub fn new() -> Self {
        Self {
            default_url: None,
            logout_url_pattern: Self::compile_pattern(DEFAULT_LOGOUT_URL_PATTERN)
                .expect("default logout pattern is valid"),
            local: Arc::new(AlwaysLogout),
            central: Arc::new(NoCentralLogout),
        }
    }

    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    /// Allow-pattern a request-supplied redirect target must fully match.
    pub fn with_logout_url_pattern(mut self, pattern: &str) -> EngineResult<Self> {
        self.logout_url_pattern = Self::compile_pattern(pattern)?;
        Ok(self)
    }

    pub fn with_local_logout(mut self, strategy: Arc<dyn LocalLogoutStrategy>) -> Self {
        self.local = strategy;
        self
    }

    pub fn with_central_logout(mut self, strategy: Arc<dyn CentralLogoutStrategy>) -> Self {
        self.central = strategy;
        self
    }

    fn compile_pattern(pattern: &str) -> EngineResult<Regex> {
        Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            EngineError::Configuration(format!("invalid logout url pattern '{pattern}': {e}"))
        })
    }

    #[tracing::instrument(name = "LogoutLogic::perform", skip_all)]
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
        let target = self.redirect_target(context);

        let manager = config.profile_manager(context);
        let profiles = manager.get_all(true).await?;
        debug!(count = profiles.len(), "logging out");

        self.local.perform(context, &manager, &profiles).await?;

        let federated = self
            .central
            .logout_action(context, config.clients(), &profiles, target.as_deref())
            .await?;

        Ok(match federated {
            Some(action) => action,
            None => target
                .map(FlowAction::redirect)
                .unwrap_or(FlowAction::Ok),
        })
    }

    fn redirect_target(&self, context: &dyn WebContext) -> Option<String> {
        match context.request_parameter(LOGOUT_URL_PARAMETER) {
            Some(url) if self.logout_url_pattern.is_match(&url) => Some(url),
            Some(url) => {
                debug!(%url, "logout target rejected by the allow-pattern");
                self.default_url.clone()
            }
            None => self.default_url.clone(),
        }
    }
}

impl Default for LogoutLogic {
    fn default() -> Self {
        Self::new()
    }
}
