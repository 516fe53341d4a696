//! Session-id rotation on successful login.

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::error::EngineResult;
use tracing::{debug, warn};

use crate::clients::registry::Clients;

#[async_trait]
pub trait SessionRenewalStrategy: Send + Sync {
    async fn renew(&self, context: &dyn WebContext, clients: &Clients) -> EngineResult<()>;
}

/// Keep the session id as it is.
pub struct NeverRenew;

#[async_trait]
impl SessionRenewalStrategy for NeverRenew {
    async fn renew(&self, _context: &dyn WebContext, _clients: &Clients) -> EngineResult<()> {
        Ok(())
    }
}

/// Rotate the session id and notify every configured client of the
/// (old, new) pair so client-held session-correlated state can migrate.
///
/// Stores that do not support rotation are tolerated: the login proceeds
/// on the existing session id.
pub struct AlwaysRenew;

#[async_trait]
impl SessionRenewalStrategy for AlwaysRenew {
    async fn renew(&self, context: &dyn WebContext, clients: &Clients) -> EngineResult<()> {
        let store = context.session_store();
        let old_id = store.get_or_create_session_id().await?;

        if !store.renew_session().await? {
            warn!("session store does not support renewal, keeping session id");
            return Ok(());
        }

        let new_id = store.get_or_create_session_id().await?;
        debug!(%old_id, %new_id, "session id rotated");
        for client in clients.all() {
            client.on_session_renewal(&old_id, &new_id, context).await?;
        }
        Ok(())
    }
}
