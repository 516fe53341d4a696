//! The neutral flow-action response adapter.

use palisade_core::context::{ResponseAdapter, WebContext};
use palisade_core::domain::flow_action::FlowAction;

/// Writes the action onto the context and hands it back to the caller.
///
/// Host frameworks usually wrap this: write through the context, then
/// convert the returned action into their native response type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowActionAdapter;

impl ResponseAdapter for FlowActionAdapter {
    type Output = FlowAction;

    fn adapt(&self, context: &dyn WebContext, action: FlowAction) -> FlowAction {
        context.set_response_status(action.status_code());
        if let Some(location) = action.location() {
            context.set_response_header("Location", location);
        } else {
            context.write_response_content(action.message());
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use crate::context::SimulatedWebContext;

    use super::*;

    #[test]
    fn redirects_write_status_and_location() {
        let ctx = SimulatedWebContext::builder().build();

        let action = FlowActionAdapter.adapt(&ctx, FlowAction::redirect("/elsewhere"));
        assert_eq!(action, FlowAction::redirect("/elsewhere"));

        let response = ctx.recorded_response();
        assert_eq!(response.status, Some(302));
        assert_eq!(
            response.headers,
            vec![("Location".to_string(), "/elsewhere".to_string())]
        );
    }

    #[test]
    fn non_redirects_write_status_and_message() {
        let ctx = SimulatedWebContext::builder().build();

        FlowActionAdapter.adapt(&ctx, FlowAction::Forbidden);

        let response = ctx.recorded_response();
        assert_eq!(response.status, Some(403));
        assert_eq!(response.content, "forbidden");
    }
}
