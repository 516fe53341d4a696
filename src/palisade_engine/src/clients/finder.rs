//! Resolution of the clients applicable to the current request.

use std::sync::Arc;

use palisade_core::client::Client;
use palisade_core::constants::ELEMENT_SEPARATOR;
use palisade_core::context::WebContext;
use palisade_core::error::{EngineError, EngineResult};
use tracing::debug;

use crate::clients::registry::Clients;

/// Resolves the ordered client list a protected request may authenticate
/// with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityClientFinder;

impl SecurityClientFinder {
    pub fn find(
        &self,
        registry: &Clients,
        context: &dyn WebContext,
        names: Option<&str>,
    ) -> EngineResult<Vec<Arc<dyn Client>>> {
        let names = names.map(str::trim).filter(|n| !n.is_empty());

        let Some(names) = names else {
            // No names requested: the default client, or the only one.
            if let Some(default) = registry.default_client() {
                return Ok(vec![default]);
            }
            if registry.all().len() == 1 {
                return Ok(vec![registry.all()[0].clone()]);
            }
            return Ok(Vec::new());
        };

        let mut resolved = Vec::new();
        for name in names.split(ELEMENT_SEPARATOR) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            resolved.push(registry.find(name)?);
        }

        // A client name on the request narrows the allowed list to that
        // single client.
        if let Some(requested) = context.request_parameter(registry.client_name_parameter()) {
            let requested = requested.trim().to_string();
            match resolved
                .iter()
                .find(|client| client.name().eq_ignore_ascii_case(&requested))
            {
                Some(client) => {
                    debug!(client = client.name(), "request narrowed the client list");
                    resolved = vec![client.clone()];
                }
                None => {
                    return Err(EngineError::Configuration(format!(
                        "client '{requested}' is not allowed on this request"
                    )));
                }
            }
        }

        Ok(resolved)
    }
}

/// Resolves the single indirect client completing its login round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackClientFinder;

impl CallbackClientFinder {
    pub fn find(
        &self,
        registry: &Clients,
        context: &dyn WebContext,
    ) -> EngineResult<Arc<dyn Client>> {
        let client = match context.request_parameter(registry.client_name_parameter()) {
            Some(name) => registry.find(&name)?,
            None => registry
                .default_client()
                .or_else(|| match registry.all() {
                    [only] => Some(only.clone()),
                    _ => None,
                })
                .ok_or_else(|| {
                    EngineError::Configuration(
                        "no client could be resolved for the callback".into(),
                    )
                })?,
        };

        if !client.is_indirect() {
            return Err(EngineError::Configuration(format!(
                "callback client '{}' must be indirect",
                client.name()
            )));
        }
        Ok(client)
    }
}
