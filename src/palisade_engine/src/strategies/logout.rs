//! Local and central logout strategies.

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::domain::flow_action::FlowAction;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::EngineResult;
use tracing::debug;

use crate::clients::registry::Clients;
use crate::profile_manager::ProfileManager;

/// Clears locally held profile and session state.
#[async_trait]
pub trait LocalLogoutStrategy: Send + Sync {
    async fn perform(
        &self,
        context: &dyn WebContext,
        manager: &ProfileManager<'_>,
        profiles: &[UserProfile],
    ) -> EngineResult<()>;
}

async fn clear_and_destroy(
    context: &dyn WebContext,
    manager: &ProfileManager<'_>,
) -> EngineResult<()> {
    manager.remove(true).await?;
    let destroyed = context.session_store().destroy_session().await?;
    debug!(destroyed, "local logout performed");
    Ok(())
}

/// Always clear profiles and destroy the session.
pub struct AlwaysLogout;

#[async_trait]
impl LocalLogoutStrategy for AlwaysLogout {
    async fn perform(
        &self,
        context: &dyn WebContext,
        manager: &ProfileManager<'_>,
        _profiles: &[UserProfile],
    ) -> EngineResult<()> {
        clear_and_destroy(context, manager).await
    }
}

/// Clear only when zero or several profiles are present; a lone profile is
/// left untouched.
pub struct ProfilePresenceDependent;

#[async_trait]
impl LocalLogoutStrategy for ProfilePresenceDependent {
    async fn perform(
        &self,
        context: &dyn WebContext,
        manager: &ProfileManager<'_>,
        profiles: &[UserProfile],
    ) -> EngineResult<()> {
        if profiles.len() == 1 {
            debug!("single profile present, keeping local state");
            return Ok(());
        }
        clear_and_destroy(context, manager).await
    }
}

/// Produces the optional federated logout action.
#[async_trait]
pub trait CentralLogoutStrategy: Send + Sync {
    async fn logout_action(
        &self,
        context: &dyn WebContext,
        clients: &Clients,
        profiles: &[UserProfile],
        target_url: Option<&str>,
    ) -> EngineResult<Option<FlowAction>>;
}

/// No identity-provider-side logout.
pub struct NoCentralLogout;

#[async_trait]
impl CentralLogoutStrategy for NoCentralLogout {
    async fn logout_action(
        &self,
        _context: &dyn WebContext,
        _clients: &Clients,
        _profiles: &[UserProfile],
        _target_url: Option<&str>,
    ) -> EngineResult<Option<FlowAction>> {
        Ok(None)
    }
}

/// Ask each profile's originating client for a federated logout action and
/// use the first one produced.
///
/// The target is only forwarded to clients when it is an absolute http(s)
/// URL; identity providers cannot redirect back to a relative path.
pub struct CentralLogout;

fn is_absolute_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[async_trait]
impl CentralLogoutStrategy for CentralLogout {
    async fn logout_action(
        &self,
        context: &dyn WebContext,
        clients: &Clients,
        profiles: &[UserProfile],
        target_url: Option<&str>,
    ) -> EngineResult<Option<FlowAction>> {
        let forward = target_url.filter(|url| is_absolute_http_url(url));

        for profile in profiles {
            let Some(client_name) = profile.client_name() else {
                debug!(profile = profile.id(), "profile has no originating client");
                continue;
            };
            let client = clients.find(client_name)?;
            if let Some(action) = client.logout_action(context, profile, forward).await? {
                return Ok(Some(action));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use palisade_adapters::context::SimulatedWebContext;
    use palisade_core::client::Client;
    use palisade_core::domain::credentials::Credentials;
    use serde_json::Value;
    use tokio::sync::Mutex;

    use super::*;

    async fn seed_session(ctx: &SimulatedWebContext, profiles: &[UserProfile]) {
        let manager = ProfileManager::new(ctx);
        for profile in profiles {
            manager.save(true, profile.clone(), true).await.unwrap();
        }
    }

    async fn session_is_empty(ctx: &SimulatedWebContext) -> bool {
        ctx.session_store()
            .get(palisade_core::constants::USER_PROFILES)
            .await
            .unwrap()
            .is_none()
    }

    #[tokio::test]
    async fn always_logout_clears_any_profile_count() {
        let ctx = SimulatedWebContext::builder().build();
        let profiles = vec![UserProfile::new("u1").with_client_name("a")];
        seed_session(&ctx, &profiles).await;

        let manager = ProfileManager::new(&ctx);
        AlwaysLogout.perform(&ctx, &manager, &profiles).await.unwrap();

        assert!(session_is_empty(&ctx).await);
    }

    #[tokio::test]
    async fn presence_dependent_keeps_a_lone_profile() {
        let ctx = SimulatedWebContext::builder().build();
        let profiles = vec![UserProfile::new("u1").with_client_name("a")];
        seed_session(&ctx, &profiles).await;

        let manager = ProfileManager::new(&ctx);
        ProfilePresenceDependent
            .perform(&ctx, &manager, &profiles)
            .await
            .unwrap();

        assert!(!session_is_empty(&ctx).await);
    }

    #[tokio::test]
    async fn presence_dependent_clears_on_two_or_more() {
        let ctx = SimulatedWebContext::builder().build();
        let profiles = vec![
            UserProfile::new("u1").with_client_name("a"),
            UserProfile::new("u2").with_client_name("b"),
        ];
        seed_session(&ctx, &profiles).await;

        let manager = ProfileManager::new(&ctx);
        ProfilePresenceDependent
            .perform(&ctx, &manager, &profiles)
            .await
            .unwrap();

        assert!(session_is_empty(&ctx).await);
    }

    #[tokio::test]
    async fn presence_dependent_clears_on_zero() {
        let ctx = SimulatedWebContext::builder().build();
        // Leave something unrelated in the session to observe destruction.
        ctx.session_store()
            .set("marker", Value::String("x".into()))
            .await
            .unwrap();

        let manager = ProfileManager::new(&ctx);
        ProfilePresenceDependent
            .perform(&ctx, &manager, &[])
            .await
            .unwrap();

        assert!(ctx.session_store().get("marker").await.unwrap().is_none());
    }

    struct FederatedClient {
        name: String,
        logout_url: Option<String>,
        seen_targets: Arc<Mutex<Vec<Option<String>>>>,
    }

    #[async_trait]
    impl Client for FederatedClient {
        fn name(&self) -> &str {
            &self.name
        }
        fn is_indirect(&self) -> bool {
            true
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
        async fn logout_action(
            &self,
            _context: &dyn WebContext,
            _profile: &UserProfile,
            target_url: Option<&str>,
        ) -> EngineResult<Option<FlowAction>> {
            self.seen_targets
                .lock()
                .await
                .push(target_url.map(str::to_string));
            Ok(self.logout_url.clone().map(FlowAction::redirect))
        }
    }

    #[tokio::test]
    async fn central_logout_uses_the_first_federated_action() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let clients = Clients::builder()
            .client(FederatedClient {
                name: "first".into(),
                logout_url: None,
                seen_targets: seen.clone(),
            })
            .client(FederatedClient {
                name: "second".into(),
                logout_url: Some("https://idp.example.org/logout".into()),
                seen_targets: seen.clone(),
            })
            .build()
            .unwrap();

        let ctx = SimulatedWebContext::builder().build();
        let profiles = vec![
            UserProfile::new("u1").with_client_name("first"),
            UserProfile::new("u2").with_client_name("second"),
        ];

        let action = CentralLogout
            .logout_action(&ctx, &clients, &profiles, Some("https://app.example.org/"))
            .await
            .unwrap();

        assert_eq!(
            action,
            Some(FlowAction::redirect("https://idp.example.org/logout"))
        );
        // Both clients were consulted, in order, with the absolute target.
        let calls = seen.lock().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].as_deref(), Some("https://app.example.org/"));
    }

    #[tokio::test]
    async fn relative_targets_are_not_forwarded() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let clients = Clients::builder()
            .client(FederatedClient {
                name: "idp".into(),
                logout_url: None,
                seen_targets: seen.clone(),
            })
            .build()
            .unwrap();

        let ctx = SimulatedWebContext::builder().build();
        let profiles = vec![UserProfile::new("u1").with_client_name("idp")];

        let action = CentralLogout
            .logout_action(&ctx, &clients, &profiles, Some("/home"))
            .await
            .unwrap();

        assert_eq!(action, None);
        assert_eq!(seen.lock().await[0], None);
    }

    #[tokio::test]
    async fn unknown_originating_client_is_a_configuration_error() {
        let clients = Clients::builder().build().unwrap();
        let ctx = SimulatedWebContext::builder().build();
        let profiles = vec![UserProfile::new("u1").with_client_name("ghost")];

        let result = CentralLogout
            .logout_action(&ctx, &clients, &profiles, None)
            .await;
        assert!(matches!(
            result,
            Err(palisade_core::error::EngineError::Configuration(_))
        ));
    }
}
