//! Named-matcher resolution and short-circuit evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use palisade_core::constants::ELEMENT_SEPARATOR;
use palisade_core::context::WebContext;
use palisade_core::error::{EngineError, EngineResult};
use palisade_core::exec::combinators::{all_hold, bool_op};

use crate::matching::Matcher;

/// Resolves matcher names against the caller-supplied registry and
/// evaluates them in order with AND semantics.
///
/// An absent or blank name list matches without evaluating anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingChecker;

impl MatchingChecker {
    pub async fn matches(
        &self,
        context: &dyn WebContext,
        names: Option<&str>,
        registry: &HashMap<String, Arc<dyn Matcher>>,
    ) -> EngineResult<bool> {
        let names = names.map(str::trim).filter(|n| !n.is_empty());
        let Some(names) = names else {
            return Ok(true);
        };

        let matchers = self.resolve(names, registry)?;
        let ops = matchers
            .into_iter()
            .map(|matcher| bool_op(async move { matcher.matches(context).await }))
            .collect();
        all_hold(ops).await
    }

    fn resolve(
        &self,
        names: &str,
        registry: &HashMap<String, Arc<dyn Matcher>>,
    ) -> EngineResult<Vec<Arc<dyn Matcher>>> {
        let mut resolved = Vec::new();
        for name in names.split(ELEMENT_SEPARATOR) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let matcher = registry
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
                .map(|(_, matcher)| matcher.clone());
            match matcher {
                Some(matcher) => resolved.push(matcher),
                None => {
                    return Err(EngineError::Configuration(format!(
                        "no matcher found for name '{name}'"
                    )));
                }
            }
        }
        Ok(resolved)
    }
}
