use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_PROFILE_KEY;

/// Id of the shared anonymous identity.
const ANONYMOUS_ID: &str = "anonymous";

/// An authenticated identity record produced by a client.
///
/// A profile carries an id, the name of the client that produced it, a role
/// set, a "remembered" flag and an open attribute bag. For storage purposes
/// profiles are keyed by their originating client name, not by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    id: String,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    remembered: bool,
    #[serde(default)]
    anonymous: bool,
    #[serde(default)]
    attributes: serde_json::Map<String, Value>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_name: None,
            roles: Vec::new(),
            remembered: false,
            anonymous: false,
            attributes: serde_json::Map::new(),
        }
    }

    /// The profile of a caller that authenticated as nobody in particular.
    pub fn anonymous() -> Self {
        Self {
            anonymous: true,
            ..Self::new(ANONYMOUS_ID)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        self.client_name = Some(name.into());
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.set_client_name(name);
        self
    }

    /// The key this profile is stored under: its client name, or the
    /// default key when no client name is set.
    pub fn store_key(&self) -> &str {
        self.client_name().unwrap_or(DEFAULT_PROFILE_KEY)
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn add_role(&mut self, role: impl Into<String>) {
        let role = role.into();
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.add_role(role);
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[String]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    pub fn has_all_roles(&self, roles: &[String]) -> bool {
        roles.iter().all(|r| self.has_role(r))
    }

    pub fn is_remembered(&self) -> bool {
        self.remembered
    }

    pub fn set_remembered(&mut self, remembered: bool) {
        self.remembered = remembered;
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    pub fn attributes(&self) -> &serde_json::Map<String, Value> {
        &self.attributes
    }
}
