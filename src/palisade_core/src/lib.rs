pub mod client;
pub mod constants;
pub mod context;
pub mod domain;
pub mod error;
pub mod exec;

// Re-export commonly used types for convenience
pub use domain::{
    credentials::Credentials,
    flow_action::FlowAction,
    profile::UserProfile,
    profile_store::ProfileStore,
};

pub use error::{EngineError, EngineResult};

pub use context::{Cookie, ResponseAdapter, SessionStore, WebContext};

pub use client::{Client, ClientsView, recovered_credentials};

pub use exec::{
    adapter::{from_blocking, from_non_blocking},
    combinators::{all_hold, any_holds, bool_op, join_ordered, with_fallback},
    scheduler::ContextScheduler,
};
