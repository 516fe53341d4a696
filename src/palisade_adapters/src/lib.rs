pub mod clients;
pub mod context;
pub mod response;
pub mod session;

// Re-export commonly used types for convenience
pub use clients::{
    AnonymousClient, CredentialsResolver, DirectHeaderClient, DirectParameterClient,
    FnCredentialsResolver, RedirectLoginClient,
};
pub use context::{RecordedResponse, SimulatedWebContext};
pub use response::FlowActionAdapter;
pub use session::{InMemorySessionStore, SessionRegistry};
