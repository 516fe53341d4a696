pub mod auth_state;
pub mod checker;
pub mod cors;
pub mod csrf;
pub mod headers;
pub mod roles;

use std::sync::Arc;

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::EngineResult;
use palisade_core::exec::combinators::{all_hold, bool_op};

/// A post-authentication policy check.
///
/// Authorizers may also raise a flow action through the error channel to
/// override the default forbidden handling (e.g. force a redirect).
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool>;
}

/// A fixed group of authorizers evaluated in order with AND semantics.
pub struct CompositeAuthorizer {
    members: Vec<Arc<dyn Authorizer>>,
}

impl CompositeAuthorizer {
    pub fn new(members: Vec<Arc<dyn Authorizer>>) -> Self {
        Self { members }
    }
}

#[async_trait]
impl Authorizer for CompositeAuthorizer {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        let ops = self
            .members
            .iter()
            .map(|member| {
                let member = member.clone();
                let profiles = profiles.to_vec();
                bool_op(async move { member.is_authorized(context, &profiles).await })
            })
            .collect();
        all_hold(ops).await
    }
}
