use std::fmt;

use serde::{Deserialize, Serialize};

/// A terminal instruction overriding default request handling.
///
/// Flow actions are not failures: they are the normal way the engine says
/// "stop processing and answer the request differently". Any authorizer,
/// matcher or client may raise one through the error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    /// Send the caller somewhere else (302).
    Redirect { location: String },
    /// The caller is not authenticated (401).
    Unauthorized,
    /// The caller is authenticated but not allowed (403).
    Forbidden,
    /// Processing finished normally (200).
    Ok,
    /// An arbitrary status code.
    Status { code: u16 },
}

impl FlowAction {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
        }
    }

    pub fn status(code: u16) -> Self {
        Self::Status { code }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Redirect { .. } => 302,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Ok => 200,
            Self::Status { code } => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Redirect { .. } => "redirect",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Ok => "ok",
            Self::Status { .. } => "status",
        }
    }

    /// The redirect target, for redirect actions only.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location } => Some(location.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FlowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(location) => write!(
                f,
                "{} ({}) -> {}",
                self.message(),
                self.status_code(),
                location
            ),
            None => write!(f, "{} ({})", self.message(), self.status_code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_http_semantics() {
        assert_eq!(FlowAction::redirect("/elsewhere").status_code(), 302);
        assert_eq!(FlowAction::Unauthorized.status_code(), 401);
        assert_eq!(FlowAction::Forbidden.status_code(), 403);
        assert_eq!(FlowAction::Ok.status_code(), 200);
        assert_eq!(FlowAction::status(418).status_code(), 418);
    }

    #[test]
    fn location_only_on_redirects() {
        assert_eq!(
            FlowAction::redirect("/target").location(),
            Some("/target")
        );
        assert_eq!(FlowAction::Forbidden.location(), None);
    }

    #[test]
    fn display_includes_location() {
        let action = FlowAction::redirect("https://idp.example.org/login");
        assert_eq!(
            action.to_string(),
            "redirect (302) -> https://idp.example.org/login"
        );
    }
}
