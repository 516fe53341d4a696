pub mod authenticators;
pub mod callback;
pub mod logout;
pub mod security;

use palisade_core::context::{ResponseAdapter, WebContext};
use palisade_core::error::EngineResult;

use crate::config::EngineConfig;

/// Route a terminal outcome through the error seam and the response
/// adapter.
fn finish<A: ResponseAdapter>(
    context: &dyn WebContext,
    config: &EngineConfig,
    adapter: &A,
    outcome: EngineResult<A::Output>,
) -> A::Output {
    match outcome {
        Ok(output) => output,
        Err(error) => {
            let action = config.error_handler().handle(context, error);
            adapter.adapt(context, action)
        }
    }
}
