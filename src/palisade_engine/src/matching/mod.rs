pub mod checker;
pub mod matchers;

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::error::EngineResult;

/// A pre-authorization request gate.
///
/// When a matcher returns false the request bypasses protection entirely.
/// A matcher may also raise a flow action through the error channel.
#[async_trait]
pub trait Matcher: Send + Sync {
    async fn matches(&self, context: &dyn WebContext) -> EngineResult<bool>;
}
