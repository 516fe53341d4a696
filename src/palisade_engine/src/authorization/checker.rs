//! Named-authorizer resolution and short-circuit evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use palisade_core::constants::ELEMENT_SEPARATOR;
use palisade_core::context::WebContext;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::{EngineError, EngineResult};
use palisade_core::exec::combinators::{all_hold, bool_op};
use tracing::debug;

use crate::authorization::auth_state::{
    IsAnonymousAuthorizer, IsAuthenticatedAuthorizer, IsFullyAuthenticatedAuthorizer,
    IsRememberedAuthorizer,
};
use crate::authorization::cors::CorsAuthorizer;
use crate::authorization::csrf::{CsrfAuthorizer, CsrfTokenGeneratorAuthorizer};
use crate::authorization::headers::{
    FrameDenyHeader, HstsHeader, NoCacheHeaders, NosniffHeader, XssProtectionHeader,
};
use crate::authorization::{Authorizer, CompositeAuthorizer};

/// Resolves authorizer names and evaluates the resulting list in order
/// with AND semantics.
///
/// Names are matched case-insensitively, first against the immutable
/// built-in table constructed here, then against the caller-supplied
/// registry. An unknown name is a configuration error.
pub struct AuthorizationChecker {
    builtins: HashMap<&'static str, Arc<dyn Authorizer>>,
}

impl AuthorizationChecker {
    pub fn new() -> Self {
        let hsts: Arc<dyn Authorizer> = Arc::new(HstsHeader::default());
        let nosniff: Arc<dyn Authorizer> = Arc::new(NosniffHeader);
        let noframe: Arc<dyn Authorizer> = Arc::new(FrameDenyHeader);
        let xss: Arc<dyn Authorizer> = Arc::new(XssProtectionHeader);
        let nocache: Arc<dyn Authorizer> = Arc::new(NoCacheHeaders);
        let csrf_token: Arc<dyn Authorizer> = Arc::new(CsrfTokenGeneratorAuthorizer::new());
        let csrf_check: Arc<dyn Authorizer> = Arc::new(CsrfAuthorizer::default());

        let security_headers: Arc<dyn Authorizer> = Arc::new(CompositeAuthorizer::new(vec![
            hsts.clone(),
            nosniff.clone(),
            noframe.clone(),
            xss.clone(),
            nocache.clone(),
        ]));
        let csrf: Arc<dyn Authorizer> = Arc::new(CompositeAuthorizer::new(vec![
            csrf_token.clone(),
            csrf_check.clone(),
        ]));

        let mut builtins: HashMap<&'static str, Arc<dyn Authorizer>> = HashMap::new();
        builtins.insert("hsts", hsts);
        builtins.insert("nosniff", nosniff);
        builtins.insert("noframe", noframe);
        builtins.insert("xssprotection", xss);
        builtins.insert("nocache", nocache);
        builtins.insert("securityheaders", security_headers);
        builtins.insert("csrftoken", csrf_token);
        builtins.insert("csrfcheck", csrf_check);
        builtins.insert("csrf", csrf);
        builtins.insert("allowajaxrequests", Arc::new(CorsAuthorizer::allow_all()));
        builtins.insert("isanonymous", Arc::new(IsAnonymousAuthorizer));
        builtins.insert("isauthenticated", Arc::new(IsAuthenticatedAuthorizer));
        builtins.insert(
            "isfullyauthenticated",
            Arc::new(IsFullyAuthenticatedAuthorizer),
        );
        builtins.insert("isremembered", Arc::new(IsRememberedAuthorizer));

        Self { builtins }
    }

    /// Evaluate the named authorizers against `profiles`.
    ///
    /// A blank name list authorizes without evaluating anything. The
    /// profile list must not be empty: reaching authorization without a
    /// profile is an engine wiring error, not an authorization failure.
    pub async fn is_authorized(
        &self,
        context: &dyn WebContext,
        profiles: &[UserProfile],
        names: Option<&str>,
        registry: &HashMap<String, Arc<dyn Authorizer>>,
    ) -> EngineResult<bool> {
        if profiles.is_empty() {
            return Err(EngineError::Configuration(
                "authorization requires at least one profile".into(),
            ));
        }

        let names = names.map(str::trim).filter(|n| !n.is_empty());
        let Some(names) = names else {
            return Ok(true);
        };

        let authorizers = self.resolve(names, registry)?;
        debug!(count = authorizers.len(), "evaluating authorizers");

        let ops = authorizers
            .into_iter()
            .map(|authorizer| {
                let profiles = profiles.to_vec();
                bool_op(async move { authorizer.is_authorized(context, &profiles).await })
            })
            .collect();
        all_hold(ops).await
    }

    fn resolve(
        &self,
        names: &str,
        registry: &HashMap<String, Arc<dyn Authorizer>>,
    ) -> EngineResult<Vec<Arc<dyn Authorizer>>> {
        let mut resolved = Vec::new();
        for name in names.split(ELEMENT_SEPARATOR) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(builtin) = self.builtins.get(name.to_ascii_lowercase().as_str()) {
                resolved.push(builtin.clone());
                continue;
            }
            let custom = registry
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
                .map(|(_, authorizer)| authorizer.clone());
            match custom {
                Some(authorizer) => resolved.push(authorizer),
                None => {
                    return Err(EngineError::Configuration(format!(
                        "no authorizer found for name '{name}'"
                    )));
                }
            }
        }
        Ok(resolved)
    }
}

impl Default for AuthorizationChecker {
    fn default() -> Self {
        Self::new()
    }
}
