//! Authorizers over the authentication state of the current profiles.
//!
//! Each check must hold for every profile in the list.

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::EngineResult;

use crate::authorization::Authorizer;

/// Every profile is the anonymous one.
#[derive(Default)]
pub struct IsAnonymousAuthorizer;

#[async_trait]
impl Authorizer for IsAnonymousAuthorizer {
    async fn is_authorized(
        &self,
        _context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        Ok(profiles.iter().all(UserProfile::is_anonymous))
    }
}

/// Every profile belongs to an actual identity.
#[derive(Default)]
pub struct IsAuthenticatedAuthorizer;

#[async_trait]
impl Authorizer for IsAuthenticatedAuthorizer {
    async fn is_authorized(
        &self,
        _context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        Ok(!profiles.is_empty() && profiles.iter().all(|p| !p.is_anonymous()))
    }
}

/// Authenticated through an actual login this session, not a remembered one.
#[derive(Default)]
pub struct IsFullyAuthenticatedAuthorizer;

#[async_trait]
impl Authorizer for IsFullyAuthenticatedAuthorizer {
    async fn is_authorized(
        &self,
        _context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        Ok(!profiles.is_empty()
            && profiles
                .iter()
                .all(|p| !p.is_anonymous() && !p.is_remembered()))
    }
}

/// Authenticated through remembered credentials only.
#[derive(Default)]
pub struct IsRememberedAuthorizer;

#[async_trait]
impl Authorizer for IsRememberedAuthorizer {
    async fn is_authorized(
        &self,
        _context: &dyn WebContext,
        profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        Ok(!profiles.is_empty()
            && profiles
                .iter()
                .all(|p| !p.is_anonymous() && p.is_remembered()))
    }
}
