//! In-memory session storage.
//!
//! A [`SessionRegistry`] holds every live session; each context gets an
//! [`InMemorySessionStore`] bound to the registry and lazily attached to
//! one session id. Suitable for tests and single-process embeddings.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use palisade_core::context::SessionStore;
use palisade_core::error::EngineResult;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// The shared map of session id → session data.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, HashMap<String, Value>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// One context's view onto the registry.
pub struct InMemorySessionStore {
    registry: Arc<SessionRegistry>,
    session_id: RwLock<Option<String>>,
    renewable: bool,
}

impl InMemorySessionStore {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            registry,
            session_id: RwLock::new(None),
            renewable: true,
        }
    }

    /// A store whose backend cannot rotate session ids.
    pub fn non_renewable(registry: Arc<SessionRegistry>) -> Self {
        Self {
            renewable: false,
            ..Self::new(registry)
        }
    }

    /// A store attached to an existing session id.
    pub fn attached(registry: Arc<SessionRegistry>, session_id: impl Into<String>) -> Self {
        Self {
            registry,
            session_id: RwLock::new(Some(session_id.into())),
            renewable: true,
        }
    }

    async fn current_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create_session_id(&self) -> EngineResult<String> {
        let mut guard = self.session_id.write().await;
        if let Some(id) = guard.as_ref() {
            return Ok(id.clone());
        }
        let id = Uuid::new_v4().to_string();
        self.registry.sessions.insert(id.clone(), HashMap::new());
        *guard = Some(id.clone());
        Ok(id)
    }

    async fn get(&self, key: &str) -> EngineResult<Option<Value>> {
        let Some(id) = self.current_id().await else {
            return Ok(None);
        };
        Ok(self
            .registry
            .sessions
            .get(&id)
            .and_then(|session| session.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> EngineResult<()> {
        let id = self.get_or_create_session_id().await?;
        let mut session = self.registry.sessions.entry(id).or_default();
        if value.is_null() {
            session.remove(key);
        } else {
            session.insert(key.to_string(), value);
        }
        Ok(())
    }

    async fn destroy_session(&self) -> EngineResult<bool> {
        let mut guard = self.session_id.write().await;
        let Some(id) = guard.take() else {
            return Ok(false);
        };
        Ok(self.registry.sessions.remove(&id).is_some())
    }

    async fn renew_session(&self) -> EngineResult<bool> {
        if !self.renewable {
            return Ok(false);
        }
        let mut guard = self.session_id.write().await;
        let data = match guard.take() {
            Some(old_id) => self
                .registry
                .sessions
                .remove(&old_id)
                .map(|(_, data)| data)
                .unwrap_or_default(),
            None => HashMap::new(),
        };
        let new_id = Uuid::new_v4().to_string();
        self.registry.sessions.insert(new_id.clone(), data);
        *guard = Some(new_id);
        Ok(true)
    }

    async fn trackable_session(&self) -> EngineResult<Option<Value>> {
        Ok(self.current_id().await.map(Value::String))
    }

    async fn session_from_trackable(
        &self,
        trackable: Value,
    ) -> EngineResult<Option<Arc<dyn SessionStore>>> {
        let Some(id) = trackable.as_str() else {
            return Ok(None);
        };
        if !self.registry.sessions.contains_key(id) {
            return Ok(None);
        }
        Ok(Some(Arc::new(Self::attached(self.registry.clone(), id))))
    }
}
