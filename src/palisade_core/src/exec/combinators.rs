//! Generic operators over asynchronous results.

use std::future::Future;
use std::pin::Pin;

use crate::error::EngineResult;

/// A boxed boolean-producing operation, evaluated lazily.
pub type BoolOp<'a> = Pin<Box<dyn Future<Output = EngineResult<bool>> + Send + 'a>>;

/// Box a future into a [`BoolOp`].
pub fn bool_op<'a, F>(fut: F) -> BoolOp<'a>
where
    F: Future<Output = EngineResult<bool>> + Send + 'a,
{
    Box::pin(fut)
}

/// Evaluate `ops` strictly in declaration order, stopping at the first
/// result equal to `stop_value`. Operations after the stop are never
/// polled. An exhausted (or empty) sequence yields the complement.
async fn eval_short_circuit(ops: Vec<BoolOp<'_>>, stop_value: bool) -> EngineResult<bool> {
    for op in ops {
        if op.await? == stop_value {
            return Ok(stop_value);
        }
    }
    Ok(!stop_value)
}

/// AND semantics: true iff every operation yields true. The first false
/// short-circuits; an empty sequence is true.
pub async fn all_hold(ops: Vec<BoolOp<'_>>) -> EngineResult<bool> {
    eval_short_circuit(ops, false).await
}

/// First-success semantics: true iff any operation yields true. The first
/// true short-circuits; an empty sequence is false.
pub async fn any_holds(ops: Vec<BoolOp<'_>>) -> EngineResult<bool> {
    eval_short_circuit(ops, true).await
}

/// Run all operations concurrently and yield their results in declaration
/// order. Any single failure fails the whole join; siblings already
/// started are not cancelled retroactively.
pub async fn join_ordered<T, F>(ops: Vec<F>) -> EngineResult<Vec<T>>
where
    F: Future<Output = EngineResult<T>>,
{
    futures::future::try_join_all(ops).await
}

/// Resolve `primary`; when its value is absent, compute the fallback.
pub async fn with_fallback<T, P, F, Fut>(primary: P, fallback: F) -> EngineResult<T>
where
    P: Future<Output = EngineResult<Option<T>>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    match primary.await? {
        Some(value) => Ok(value),
        None => fallback().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::error::EngineError;

    fn ready_ops(values: &[bool]) -> Vec<BoolOp<'static>> {
        values
            .iter()
            .map(|&v| bool_op(async move { Ok(v) }))
            .collect()
    }

    #[tokio::test]
    async fn all_hold_stops_at_the_first_false() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();

        let ops = vec![
            bool_op(async { Ok(false) }),
            bool_op(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
        ];

        assert!(!all_hold(ops).await.unwrap());
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn any_holds_stops_at_the_first_true() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();

        let ops = vec![
            bool_op(async { Ok(true) }),
            bool_op(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            }),
        ];

        assert!(any_holds(ops).await.unwrap());
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_sequences_yield_the_complement() {
        assert!(all_hold(Vec::new()).await.unwrap());
        assert!(!any_holds(Vec::new()).await.unwrap());
    }

    #[tokio::test]
    async fn failures_propagate_before_the_stop_value() {
        let ops = vec![
            bool_op(async { Err(EngineError::Unexpected("store down".into())) }),
            bool_op(async { Ok(false) }),
        ];
        assert!(all_hold(ops).await.is_err());
    }

    #[quickcheck]
    fn all_hold_matches_iterator_all(values: Vec<bool>) -> bool {
        let expected = values.iter().all(|&v| v);
        let actual = futures::executor::block_on(all_hold(ready_ops(&values))).unwrap();
        actual == expected
    }

    #[quickcheck]
    fn any_holds_matches_iterator_any(values: Vec<bool>) -> bool {
        let expected = values.iter().any(|&v| v);
        let actual = futures::executor::block_on(any_holds(ready_ops(&values))).unwrap();
        actual == expected
    }

    #[tokio::test]
    async fn join_preserves_declaration_order() {
        let ops = vec![
            Box::pin(async {
                tokio::task::yield_now().await;
                Ok("first")
            }) as Pin<Box<dyn Future<Output = EngineResult<&str>> + Send>>,
            Box::pin(async { Ok("second") }),
        ];

        let results = join_ordered(ops).await.unwrap();
        assert_eq!(results, ["first", "second"]);
    }

    #[tokio::test]
    async fn join_fails_when_any_operation_fails() {
        let ops = vec![
            Box::pin(async { Ok(1) }) as Pin<Box<dyn Future<Output = EngineResult<i32>> + Send>>,
            Box::pin(async { Err(EngineError::Unexpected("nope".into())) }),
        ];
        assert!(join_ordered(ops).await.is_err());
    }

    #[tokio::test]
    async fn with_fallback_prefers_the_primary() {
        let value = with_fallback(async { Ok(Some(1)) }, || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn with_fallback_fills_absence() {
        let value = with_fallback(async { Ok(None) }, || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }
}
