//! Profile bookkeeping across request and session scope.

use std::sync::Arc;

use palisade_core::constants::USER_PROFILES;
use palisade_core::context::{SessionStore, WebContext};
use palisade_core::domain::profile::UserProfile;
use palisade_core::domain::profile_store::ProfileStore;
use palisade_core::error::{EngineError, EngineResult};
use serde_json::Value;

/// Reads and writes the authenticated-profile set for one context.
///
/// Profiles live in two scopes: a request-scope store (valid for the
/// current call only, held as a request attribute) and a session-scope
/// store (durable, held in the session store). Reads merge the two with
/// session entries applied after request entries; every merge and write
/// runs under the context's exclusive-mutation scheduler so concurrent
/// readers never observe a half-written store.
pub struct ProfileManager<'a> {
    context: &'a dyn WebContext,
    session_store: Arc<dyn SessionStore>,
}

impl<'a> ProfileManager<'a> {
    pub fn new(context: &'a dyn WebContext) -> Self {
        let session_store = context.session_store();
        Self {
            context,
            session_store,
        }
    }

    /// Use a session store other than the context's own, e.g. a store
    /// rebuilt from a trackable session handle.
    pub fn with_session_store(context: &'a dyn WebContext, session_store: Arc<dyn SessionStore>) -> Self {
        Self {
            context,
            session_store,
        }
    }

    /// The merged profile store.
    pub async fn profile_store(&self, read_from_session: bool) -> EngineResult<ProfileStore> {
        if !read_from_session {
            return Ok(self.request_store());
        }
        let scheduler = self.context.scheduler();
        scheduler.run_exclusive(self.load_merged(true)).await
    }

    /// All profiles, in store order.
    pub async fn get_all(&self, read_from_session: bool) -> EngineResult<Vec<UserProfile>> {
        Ok(self.profile_store(read_from_session).await?.profiles())
    }

    /// The first profile belonging to an actual identity, if any.
    pub async fn get(&self, read_from_session: bool) -> EngineResult<Option<UserProfile>> {
        Ok(self
            .profile_store(read_from_session)
            .await?
            .first_non_anonymous()
            .cloned())
    }

    /// Persist `profile` under its client-name key.
    ///
    /// In multi-profile mode the existing store is upserted, preserving
    /// unrelated entries and their order; otherwise the store is replaced
    /// with this single entry. The request scope is always written; the
    /// session scope only when `save_in_session`.
    pub async fn save(
        &self,
        save_in_session: bool,
        profile: UserProfile,
        multi_profile: bool,
    ) -> EngineResult<bool> {
        let scheduler = self.context.scheduler();
        scheduler
            .run_exclusive(async move {
                let mut store = if multi_profile {
                    self.load_merged(save_in_session).await?
                } else {
                    ProfileStore::new()
                };
                let key = profile.store_key().to_string();
                store.put(key, profile);

                let value = serde_json::to_value(&store).map_err(|e| {
                    EngineError::Unexpected(format!("profile store serialization failed: {e}"))
                })?;
                self.context.set_request_attribute(USER_PROFILES, value.clone());
                if save_in_session {
                    self.session_store.set(USER_PROFILES, value).await?;
                }
                Ok(true)
            })
            .await
    }

    /// Clear the request scope, and the session scope when requested.
    pub async fn remove(&self, remove_from_session: bool) -> EngineResult<()> {
        let scheduler = self.context.scheduler();
        scheduler
            .run_exclusive(async move {
                self.context.set_request_attribute(USER_PROFILES, Value::Null);
                if remove_from_session {
                    self.session_store.set(USER_PROFILES, Value::Null).await?;
                }
                Ok(())
            })
            .await
    }

    pub async fn logout(&self) -> EngineResult<()> {
        self.remove(true).await
    }

    pub async fn is_authenticated(&self) -> EngineResult<bool> {
        Ok(self
            .get_all(true)
            .await?
            .iter()
            .any(|profile| !profile.is_anonymous()))
    }

    // Scope readers. Callers needing the merged view must hold the
    // scheduler; see profile_store/save.

    fn request_store(&self) -> ProfileStore {
        self.context
            .request_attribute(USER_PROFILES)
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    async fn session_scope(&self) -> EngineResult<ProfileStore> {
        match self.session_store.get(USER_PROFILES).await? {
            Some(value) if !value.is_null() => serde_json::from_value(value)
                .map_err(|e| EngineError::Unexpected(format!("stored profiles are corrupt: {e}"))),
            _ => Ok(ProfileStore::default()),
        }
    }

    async fn load_merged(&self, read_from_session: bool) -> EngineResult<ProfileStore> {
        let mut store = self.request_store();
        if read_from_session {
            store.merge(self.session_scope().await?);
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use palisade_adapters::context::SimulatedWebContext;

    use super::*;

    fn context() -> SimulatedWebContext {
        SimulatedWebContext::builder().build()
    }

    #[tokio::test]
    async fn save_then_read_round_trips_one_profile() {
        let ctx = context();
        let manager = ProfileManager::new(&ctx);

        let profile = UserProfile::new("u1").with_client_name("oidc");
        manager.save(true, profile.clone(), false).await.unwrap();

        let all = manager.get_all(true).await.unwrap();
        assert_eq!(all, vec![profile]);
    }

    #[tokio::test]
    async fn single_profile_save_replaces_the_store() {
        let ctx = context();
        let manager = ProfileManager::new(&ctx);

        manager
            .save(true, UserProfile::new("u1").with_client_name("a"), false)
            .await
            .unwrap();
        manager
            .save(true, UserProfile::new("u2").with_client_name("b"), false)
            .await
            .unwrap();

        let store = manager.profile_store(true).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.first().unwrap().id(), "u2");
    }

    #[tokio::test]
    async fn multi_profile_save_upserts_and_preserves_order() {
        let ctx = context();
        let manager = ProfileManager::new(&ctx);

        manager
            .save(true, UserProfile::new("u1").with_client_name("a"), true)
            .await
            .unwrap();
        manager
            .save(true, UserProfile::new("u2").with_client_name("b"), true)
            .await
            .unwrap();
        manager
            .save(true, UserProfile::new("u3").with_client_name("a"), true)
            .await
            .unwrap();

        let store = manager.profile_store(true).await.unwrap();
        assert_eq!(store.len(), 2);
        let keys: Vec<_> = store.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(store.get("a").unwrap().id(), "u3");
    }

    #[tokio::test]
    async fn profile_without_client_name_uses_the_default_key() {
        let ctx = context();
        let manager = ProfileManager::new(&ctx);

        manager.save(true, UserProfile::new("u1"), false).await.unwrap();

        let store = manager.profile_store(true).await.unwrap();
        let keys: Vec<_> = store.keys().collect();
        assert_eq!(keys, ["DEFAULT"]);
    }

    #[tokio::test]
    async fn session_entries_apply_after_request_entries() {
        let ctx = context();
        let manager = ProfileManager::new(&ctx);

        // Request scope only.
        manager
            .save(false, UserProfile::new("request").with_client_name("a"), false)
            .await
            .unwrap();
        // Session scope via a second context sharing the session store.
        ctx.session_store()
            .set(
                USER_PROFILES,
                serde_json::to_value(ProfileStore::from_profile(
                    UserProfile::new("session").with_client_name("a"),
                ))
                .unwrap(),
            )
            .await
            .unwrap();

        let merged = manager.profile_store(true).await.unwrap();
        assert_eq!(merged.get("a").unwrap().id(), "session");
    }

    #[tokio::test]
    async fn remove_clears_the_requested_scopes() {
        let ctx = context();
        let manager = ProfileManager::new(&ctx);

        manager
            .save(true, UserProfile::new("u1").with_client_name("a"), false)
            .await
            .unwrap();
        manager.remove(false).await.unwrap();

        // Request scope gone, session scope still there.
        assert!(manager.get_all(false).await.unwrap().is_empty());
        assert_eq!(manager.get_all(true).await.unwrap().len(), 1);

        manager.logout().await.unwrap();
        assert!(manager.get_all(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn anonymous_profiles_do_not_authenticate() {
        let ctx = context();
        let manager = ProfileManager::new(&ctx);

        manager.save(true, UserProfile::anonymous(), false).await.unwrap();
        assert!(!manager.is_authenticated().await.unwrap());
        assert!(manager.get(true).await.unwrap().is_none());

        manager
            .save(true, UserProfile::new("u1").with_client_name("a"), false)
            .await
            .unwrap();
        assert!(manager.is_authenticated().await.unwrap());
        assert_eq!(manager.get(true).await.unwrap().unwrap().id(), "u1");
    }
}
