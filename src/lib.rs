//! # Palisade - Framework-Agnostic Security Engine
//!
//! This is a facade crate that re-exports all public APIs from the engine
//! components. Use this crate to get access to the whole security engine
//! in one place.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! palisade = { path = "../palisade" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `UserProfile`, `Credentials`, `FlowAction`, etc.
//! - **Collaborator traits**: `WebContext`, `SessionStore`, `Client`
//! - **Engine**: `SecurityLogic`, `CallbackLogic`, `LogoutLogic`,
//!   `ProfileManager`, checkers and strategies
//! - **Adapters**: `SimulatedWebContext`, `InMemorySessionStore`, reusable
//!   clients

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types, collaborator traits and async primitives
pub mod core {
    pub use palisade_core::*;
}

// Re-export most commonly used core types at the root level
pub use palisade_core::{
    Cookie, Credentials, EngineError, EngineResult, FlowAction, ProfileStore, UserProfile,
};

// ============================================================================
// Collaborator Traits (Ports)
// ============================================================================

pub use palisade_core::{Client, ClientsView, ResponseAdapter, SessionStore, WebContext};

// ============================================================================
// Async Computation Primitives
// ============================================================================

pub use palisade_core::{
    ContextScheduler, all_hold, any_holds, from_blocking, from_non_blocking, join_ordered,
    with_fallback,
};

// ============================================================================
// Engine (Application Layer)
// ============================================================================

/// The orchestration engine
pub mod engine {
    pub use palisade_engine::*;
}

// Re-export the engine entry points at root level
pub use palisade_engine::{
    AuthorizationChecker, Authorizer, CallbackLogic, Clients, EngineConfig, LogoutLogic,
    Matcher, MatchingChecker, ProfileManager, SecurityLogic,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Simulated context and response recorder
    pub mod context {
        pub use palisade_adapters::context::*;
    }

    /// In-memory session storage
    pub mod session {
        pub use palisade_adapters::session::*;
    }

    /// Reusable client building blocks
    pub mod clients {
        pub use palisade_adapters::clients::*;
    }

    /// Flow-action response adapters
    pub mod response {
        pub use palisade_adapters::response::*;
    }
}

// Re-export commonly used adapters at root level
pub use palisade_adapters::{
    AnonymousClient, DirectHeaderClient, DirectParameterClient, FlowActionAdapter,
    InMemorySessionStore, RedirectLoginClient, SessionRegistry, SimulatedWebContext,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing collaborator traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with credential material
pub use secrecy::{ExposeSecret, Secret};

/// Re-export serde_json: session-store values are JSON values
pub use serde_json;
