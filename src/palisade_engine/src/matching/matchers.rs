//! Reusable matcher building blocks.

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::error::{EngineError, EngineResult};
use regex::Regex;

use crate::matching::Matcher;

/// Excludes request paths matching any of the configured patterns.
pub struct PathMatcher {
    exclusions: Vec<Regex>,
}

impl PathMatcher {
    pub fn new() -> Self {
        Self {
            exclusions: Vec::new(),
        }
    }

    /// Exclude paths fully matching `pattern`.
    pub fn exclude(mut self, pattern: &str) -> EngineResult<Self> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|e| {
            EngineError::Configuration(format!("invalid path exclusion '{pattern}': {e}"))
        })?;
        self.exclusions.push(regex);
        Ok(self)
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Matcher for PathMatcher {
    async fn matches(&self, context: &dyn WebContext) -> EngineResult<bool> {
        let path = context.path();
        Ok(!self.exclusions.iter().any(|regex| regex.is_match(&path)))
    }
}

/// Matches only the configured HTTP methods.
pub struct HttpMethodMatcher {
    methods: Vec<String>,
}

impl HttpMethodMatcher {
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods
                .into_iter()
                .map(|m| m.into().to_ascii_uppercase())
                .collect(),
        }
    }
}

#[async_trait]
impl Matcher for HttpMethodMatcher {
    async fn matches(&self, context: &dyn WebContext) -> EngineResult<bool> {
        let method = context.request_method().to_ascii_uppercase();
        Ok(self.methods.iter().any(|m| *m == method))
    }
}
