use std::future::Future;

use tokio::sync::Mutex;

/// The serialization boundary owning one context's mutable state.
///
/// Several asynchronous branches of a request may complete in parallel, on
/// different workers. Any continuation that mutates context-associated
/// state (response headers, request attributes, the profile/session merge)
/// must run through this scheduler, which guarantees a single writer at a
/// time without assuming a single-threaded runtime.
///
/// On a single-threaded target the lock is uncontended and scheduling
/// degenerates to immediate execution.
#[derive(Debug, Default)]
pub struct ContextScheduler {
    serializer: Mutex<()>,
}

impl ContextScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a synchronous task on the owning affinity domain.
    pub async fn run_on_context<T>(&self, task: impl FnOnce() -> T) -> T {
        let _guard = self.serializer.lock().await;
        task()
    }

    /// Run an asynchronous critical section exclusively.
    ///
    /// Not reentrant: a future running inside must not call back into the
    /// same scheduler.
    pub async fn run_exclusive<F, T>(&self, section: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.serializer.lock().await;
        section.await
    }
}
