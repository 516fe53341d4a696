use thiserror::Error;

use crate::domain::flow_action::FlowAction;

pub type EngineResult<T> = Result<T, EngineError>;

/// The engine-wide error taxonomy.
///
/// Flow actions travel through this channel as a typed variant, so a
/// terminal instruction never needs to be recovered from a generic failure
/// wrapper; callers match on the variant instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad wiring: unknown names, duplicate registrations, blank required
    /// values. Fatal for the request, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Credential extraction or validation rejected the input. Recovered
    /// locally as "no credentials"; never surfaced to the caller.
    #[error("credentials rejected: {0}")]
    Credentials(String),

    /// A terminal instruction overriding default handling. Not a failure.
    #[error("flow action: {0}")]
    Flow(FlowAction),

    /// Anything else, including collaborator I/O failures.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl EngineError {
    pub fn is_flow(&self) -> bool {
        matches!(self, Self::Flow(_))
    }
}

impl From<FlowAction> for EngineError {
    fn from(action: FlowAction) -> Self {
        Self::Flow(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_actions_convert_into_the_error_channel() {
        let err: EngineError = FlowAction::Forbidden.into();
        assert!(err.is_flow());
        assert!(matches!(err, EngineError::Flow(FlowAction::Forbidden)));
    }

    #[test]
    fn errors_render_their_category() {
        let err = EngineError::Configuration("unknown authorizer 'nope'".into());
        assert_eq!(
            err.to_string(),
            "configuration error: unknown authorizer 'nope'"
        );
    }
}
