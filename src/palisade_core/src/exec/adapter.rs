//! Bridges between synchronous computations and the async engine.

use std::future::Future;

use crate::error::{EngineError, EngineResult};

/// Run a non-blocking computation immediately on the calling path,
/// returning an already-resolved future.
///
/// Use only when `f` performs no I/O and cannot stall the owning context.
pub fn from_non_blocking<T>(f: impl FnOnce() -> T) -> impl Future<Output = T> {
    std::future::ready(f())
}

/// Offload a blocking computation to the worker pool.
///
/// The owning context keeps running; the result resolves when the worker
/// finishes. Cancellation of the worker is not supported.
pub async fn from_blocking<T, F>(f: F) -> EngineResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| EngineError::Unexpected(format!("blocking task failed: {e}")))
}
