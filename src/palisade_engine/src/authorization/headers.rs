//! Authorizers that attach security headers to the response.
//!
//! These always authorize; their job is the side effect on the response.

use async_trait::async_trait;
use palisade_core::context::WebContext;
use palisade_core::domain::profile::UserProfile;
use palisade_core::error::EngineResult;

use crate::authorization::Authorizer;

/// `Strict-Transport-Security`, on secure requests only.
pub struct HstsHeader {
    max_age_seconds: u64,
}

impl HstsHeader {
    pub fn new(max_age_seconds: u64) -> Self {
        Self { max_age_seconds }
    }
}

impl Default for HstsHeader {
    fn default() -> Self {
        // One year.
        Self::new(31_536_000)
    }
}

#[async_trait]
impl Authorizer for HstsHeader {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        if context.is_secure() {
            context.set_response_header(
                "Strict-Transport-Security",
                &format!("max-age={}; includeSubDomains", self.max_age_seconds),
            );
        }
        Ok(true)
    }
}

/// `X-Content-Type-Options: nosniff`.
#[derive(Default)]
pub struct NosniffHeader;

#[async_trait]
impl Authorizer for NosniffHeader {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        context.set_response_header("X-Content-Type-Options", "nosniff");
        Ok(true)
    }
}

/// `X-Frame-Options: DENY`.
#[derive(Default)]
pub struct FrameDenyHeader;

#[async_trait]
impl Authorizer for FrameDenyHeader {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        context.set_response_header("X-Frame-Options", "DENY");
        Ok(true)
    }
}

/// `X-XSS-Protection: 1; mode=block`.
#[derive(Default)]
pub struct XssProtectionHeader;

#[async_trait]
impl Authorizer for XssProtectionHeader {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        context.set_response_header("X-XSS-Protection", "1; mode=block");
        Ok(true)
    }
}

/// Cache suppression: `Cache-Control`, `Pragma` and `Expires`.
#[derive(Default)]
pub struct NoCacheHeaders;

#[async_trait]
impl Authorizer for NoCacheHeaders {
    async fn is_authorized(
        &self,
        context: &dyn WebContext,
        _profiles: &[UserProfile],
    ) -> EngineResult<bool> {
        context.set_response_header("Cache-Control", "no-cache, no-store, must-revalidate");
        context.set_response_header("Pragma", "no-cache");
        context.set_response_header("Expires", "0");
        Ok(true)
    }
}
