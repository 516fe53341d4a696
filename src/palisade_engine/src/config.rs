//! The configuration object shared by the three logics.

use std::collections::HashMap;
use std::sync::Arc;

use palisade_core::context::WebContext;
use palisade_core::domain::flow_action::FlowAction;
use palisade_core::error::EngineError;
use tracing::{debug, error, warn};

use crate::authorization::Authorizer;
use crate::clients::registry::Clients;
use crate::matching::Matcher;
use crate::profile_manager::ProfileManager;

/// The single error-handling seam.
///
/// Every terminal outcome of the logics passes through here before being
/// adapted to a protocol response: flow actions untouched, anything else
/// converted to the response the embedding wants to fail with.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, context: &dyn WebContext, error: EngineError) -> FlowAction;
}

/// Logs by severity; configuration and unexpected errors fail loudly.
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, _context: &dyn WebContext, error: EngineError) -> FlowAction {
        match error {
            EngineError::Flow(action) => {
                debug!(action = %action, "terminal flow action");
                action
            }
            EngineError::Configuration(message) => {
                error!(%message, "configuration error");
                FlowAction::status(500)
            }
            EngineError::Unexpected(message) => {
                error!(%message, "unexpected error");
                FlowAction::status(500)
            }
            EngineError::Credentials(message) => {
                // Normally recovered at the extraction seam.
                warn!(%message, "credential failure reached the response boundary");
                FlowAction::Unauthorized
            }
        }
    }
}

/// Controls how a profile manager is built for a context.
pub trait ProfileManagerFactory: Send + Sync {
    fn create<'a>(&self, context: &'a dyn WebContext) -> ProfileManager<'a>;
}

pub struct DefaultProfileManagerFactory;

impl ProfileManagerFactory for DefaultProfileManagerFactory {
    fn create<'a>(&self, context: &'a dyn WebContext) -> ProfileManager<'a> {
        ProfileManager::new(context)
    }
}

/// Clients, named authorizers, named matchers and the error seam.
pub struct EngineConfig {
    clients: Clients,
    authorizers: HashMap<String, Arc<dyn Authorizer>>,
    matchers: HashMap<String, Arc<dyn Matcher>>,
    error_handler: Arc<dyn ErrorHandler>,
    profile_manager_factory: Arc<dyn ProfileManagerFactory>,
}

impl EngineConfig {
    pub fn new(clients: Clients) -> Self {
        Self {
            clients,
            authorizers: HashMap::new(),
            matchers: HashMap::new(),
            error_handler: Arc::new(DefaultErrorHandler),
            profile_manager_factory: Arc::new(DefaultProfileManagerFactory),
        }
    }

    pub fn with_authorizer(
        mut self,
        name: impl Into<String>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        self.authorizers.insert(name.into(), authorizer);
        self
    }

    pub fn with_matcher(mut self, name: impl Into<String>, matcher: Arc<dyn Matcher>) -> Self {
        self.matchers.insert(name.into(), matcher);
        self
    }

    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    pub fn with_profile_manager_factory(
        mut self,
        factory: Arc<dyn ProfileManagerFactory>,
    ) -> Self {
        self.profile_manager_factory = factory;
        self
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub fn authorizers(&self) -> &HashMap<String, Arc<dyn Authorizer>> {
        &self.authorizers
    }

    pub fn matchers(&self) -> &HashMap<String, Arc<dyn Matcher>> {
        &self.matchers
    }

    pub fn error_handler(&self) -> &dyn ErrorHandler {
        self.error_handler.as_ref()
    }

    pub fn profile_manager<'a>(&self, context: &'a dyn WebContext) -> ProfileManager<'a> {
        self.profile_manager_factory.create(context)
    }
}
