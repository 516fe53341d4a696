use std::fmt;

use secrecy::{ExposeSecret, Secret};

/// Opaque per-client credential material.
///
/// Produced by a client's credential extraction and consumed by its profile
/// resolution. Absence of credentials is a normal outcome, modelled as
/// `Option<Credentials>` at the extraction seam, never as an error.
#[derive(Clone)]
pub enum Credentials {
    /// A username with its secret password (e.g. basic auth, login forms).
    UsernamePassword {
        username: String,
        password: Secret<String>,
    },
    /// A bare secret value (API key, bearer token, callback ticket).
    Token { token: Secret<String> },
    /// The explicit "nobody" credential.
    Anonymous,
}

impl Credentials {
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UsernamePassword {
            username: username.into(),
            password: Secret::new(password.into()),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self::Token {
            token: Secret::new(token.into()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::UsernamePassword { username, .. } => Some(username.as_str()),
            _ => None,
        }
    }

    pub fn expose_password(&self) -> Option<&str> {
        match self {
            Self::UsernamePassword { password, .. } => Some(password.expose_secret()),
            _ => None,
        }
    }

    pub fn expose_token(&self) -> Option<&str> {
        match self {
            Self::Token { token } => Some(token.expose_secret()),
            _ => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

// Secret material must never leak through Debug output.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}
