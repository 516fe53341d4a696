//! Strategies governing how per-client save outcomes combine.

use std::sync::Arc;

use async_trait::async_trait;
use palisade_core::client::Client;
use palisade_core::context::WebContext;
use palisade_core::error::EngineResult;
use palisade_core::exec::combinators::{all_hold, any_holds, bool_op};

/// Decides, per client, whether its profile is persisted to the session.
pub type SaveToSessionPolicy = Arc<dyn Fn(&dyn WebContext, &dyn Client) -> bool + Send + Sync>;

/// The default policy: only indirect clients keep session-backed state;
/// direct clients re-authenticate on every request.
pub fn session_saves_for_indirect_only() -> SaveToSessionPolicy {
    Arc::new(|_context, client| client.is_indirect())
}

/// Combines the ordered per-client save outcomes into one verdict.
#[async_trait]
pub trait SaveAggregation: Send + Sync {
    async fn combine(&self, results: Vec<bool>) -> EngineResult<bool>;
}

/// Every attempted client must have produced and saved a profile.
pub struct AllSavesSucceed;

#[async_trait]
impl SaveAggregation for AllSavesSucceed {
    async fn combine(&self, results: Vec<bool>) -> EngineResult<bool> {
        if results.is_empty() {
            return Ok(false);
        }
        let ops = results
            .into_iter()
            .map(|result| bool_op(async move { Ok(result) }))
            .collect();
        all_hold(ops).await
    }
}

/// One produced-and-saved profile is enough.
pub struct AnySaveSucceeds;

#[async_trait]
impl SaveAggregation for AnySaveSucceeds {
    async fn combine(&self, results: Vec<bool>) -> EngineResult<bool> {
        let ops = results
            .into_iter()
            .map(|result| bool_op(async move { Ok(result) }))
            .collect();
        any_holds(ops).await
    }
}
