//! The registry of configured authentication clients.

use std::sync::Arc;

use palisade_core::client::{Client, ClientsView};
use palisade_core::constants::DEFAULT_CLIENT_NAME_PARAMETER;
use palisade_core::error::{EngineError, EngineResult};

/// An immutable name → client registry.
///
/// Built once at configuration time: the builder constructs every client,
/// then hands each of them the registry-level settings through
/// [`Client::configure`] before the registry is frozen. Lookup is by
/// trimmed, case-insensitive name.
pub struct Clients {
    clients: Vec<Arc<dyn Client>>,
    default_client: Option<String>,
    client_name_parameter: String,
    callback_url: Option<String>,
}

impl Clients {
    pub fn builder() -> ClientsBuilder {
        ClientsBuilder::new()
    }

    pub fn all(&self) -> &[Arc<dyn Client>] {
        &self.clients
    }

    /// Look up a client by name. An unknown name is a configuration error.
    pub fn find(&self, name: &str) -> EngineResult<Arc<dyn Client>> {
        self.get(name).ok_or_else(|| {
            EngineError::Configuration(format!("no client found for name '{}'", name.trim()))
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Client>> {
        let name = name.trim();
        self.clients
            .iter()
            .find(|client| client.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn default_client(&self) -> Option<Arc<dyn Client>> {
        self.default_client
            .as_deref()
            .and_then(|name| self.get(name))
    }

    pub fn client_name_parameter(&self) -> &str {
        &self.client_name_parameter
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }
}

pub struct ClientsBuilder {
    clients: Vec<Box<dyn Client>>,
    default_client: Option<String>,
    client_name_parameter: String,
    callback_url: Option<String>,
}

impl ClientsBuilder {
    fn new() -> Self {
        Self {
            clients: Vec::new(),
            default_client: None,
            client_name_parameter: DEFAULT_CLIENT_NAME_PARAMETER.to_string(),
            callback_url: None,
        }
    }

    pub fn client(mut self, client: impl Client + 'static) -> Self {
        self.clients.push(Box::new(client));
        self
    }

    pub fn boxed_client(mut self, client: Box<dyn Client>) -> Self {
        self.clients.push(client);
        self
    }

    /// The client used when a request names none.
    pub fn default_client(mut self, name: impl Into<String>) -> Self {
        self.default_client = Some(name.into());
        self
    }

    pub fn client_name_parameter(mut self, name: impl Into<String>) -> Self {
        self.client_name_parameter = name.into();
        self
    }

    /// Where indirect clients send the identity provider back to.
    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Configure every client and freeze the registry.
    pub fn build(self) -> EngineResult<Clients> {
        let view = ClientsView {
            callback_url: self.callback_url.clone(),
            client_name_parameter: self.client_name_parameter.clone(),
        };

        let mut configured: Vec<Arc<dyn Client>> = Vec::with_capacity(self.clients.len());
        for mut client in self.clients {
            let name = client.name().trim().to_string();
            if name.is_empty() {
                return Err(EngineError::Configuration(
                    "client name must not be blank".into(),
                ));
            }
            if configured
                .iter()
                .any(|existing| existing.name().eq_ignore_ascii_case(&name))
            {
                return Err(EngineError::Configuration(format!(
                    "duplicate client name '{name}'"
                )));
            }
            client.configure(&view)?;
            configured.push(Arc::from(client));
        }

        if let Some(default) = &self.default_client {
            let known = configured
                .iter()
                .any(|client| client.name().eq_ignore_ascii_case(default.trim()));
            if !known {
                return Err(EngineError::Configuration(format!(
                    "default client '{default}' is not registered"
                )));
            }
        }

        Ok(Clients {
            clients: configured,
            default_client: self.default_client,
            client_name_parameter: self.client_name_parameter,
            callback_url: self.callback_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use palisade_core::context::WebContext;
    use palisade_core::domain::credentials::Credentials;
    use palisade_core::domain::profile::UserProfile;

    use super::*;

    struct NamedClient {
        name: String,
        configured_with: Arc<std::sync::Mutex<Option<String>>>,
    }

    impl NamedClient {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                configured_with: Arc::new(std::sync::Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl Client for NamedClient {
        fn name(&self) -> &str {
            &self.name
        }
        fn is_indirect(&self) -> bool {
            false
        }
        fn configure(&mut self, view: &ClientsView) -> EngineResult<()> {
            *self.configured_with.lock().unwrap() = view.callback_url.clone();
            Ok(())
        }
        async fn credentials(
            &self,
            _context: &dyn WebContext,
        ) -> EngineResult<Option<Credentials>> {
            Ok(None)
        }
        async fn user_profile(
            &self,
            _credentials: &Credentials,
            _context: &dyn WebContext,
        ) -> EngineResult<Option<UserProfile>> {
            Ok(None)
        }
    }

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        let registry = Clients::builder()
            .client(NamedClient::new("Basic"))
            .build()
            .unwrap();

        assert!(registry.get(" basic ").is_some());
        assert!(registry.get("BASIC").is_some());
        assert!(registry.get("unknown").is_none());
        assert!(registry.find("unknown").is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = Clients::builder()
            .client(NamedClient::new("basic"))
            .client(NamedClient::new("BASIC"))
            .build();

        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn unknown_default_client_is_rejected() {
        let result = Clients::builder()
            .client(NamedClient::new("basic"))
            .default_client("oidc")
            .build();

        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn blank_client_name_is_rejected() {
        let result = Clients::builder().client(NamedClient::new("  ")).build();
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn clients_are_configured_during_build() {
        // Two-phase initialization: construct, then configure with the
        // registry view, then freeze.
        let client = NamedClient::new("basic");
        let configured_with = client.configured_with.clone();

        let registry = Clients::builder()
            .client(client)
            .callback_url("https://app.example.org/callback")
            .build()
            .unwrap();

        assert_eq!(
            configured_with.lock().unwrap().as_deref(),
            Some("https://app.example.org/callback")
        );
        assert_eq!(
            registry.callback_url(),
            Some("https://app.example.org/callback")
        );
    }
}
