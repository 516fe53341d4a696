//! Role-based authorizers, registered by callers under names of their
//! choosing.

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::EngineResult;

use crate::authorization::Authorizer;

/// Every profile must hold at least one of the expected roles.
pub struct RequireAnyRoleAuthorizer {
    roles: Vec<String>,
}

impl RequireAnyRoleAuthorizer {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Authorizer for RequireAnyRoleAuthorizer {
    async fn is_authorized(
        &self,
        _context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        Ok(!profiles.is_empty()
            && profiles.iter().all(|p| p.has_any_role(&self.roles)))
    }
}

/// Every profile must hold all of the expected roles.
pub struct RequireAllRolesAuthorizer {
    roles: Vec<String>,
}

impl RequireAllRolesAuthorizer {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Authorizer for RequireAllRolesAuthorizer {
    async fn is_authorized(
        &self,
        _context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        Ok(!profiles.is_empty()
            && profiles.iter().all(|p| p.has_all_roles(&self.roles)))
    }
}
