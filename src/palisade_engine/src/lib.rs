pub mod authorization;
pub mod clients;
pub mod config;
pub mod logic;
pub mod matching;
pub mod profile_manager;
pub mod strategies;

// Re-export commonly used types for convenience
pub use clients::{
    finder::{CallbackClientFinder, SecurityClientFinder},
    registry::{Clients, ClientsBuilder},
};

pub use config::{
    DefaultErrorHandler, DefaultProfileManagerFactory, EngineConfig, ErrorHandler,
    ProfileManagerFactory,
};

pub use profile_manager::ProfileManager;

pub use authorization::{Authorizer, checker::AuthorizationChecker};

pub use matching::{Matcher, checker::MatchingChecker};

pub use logic::{
    authenticators::{AuthenticationFallback, DirectClientAuthenticator},
    callback::CallbackLogic,
    logout::LogoutLogic,
    security::SecurityLogic,
};

pub use strategies::{
    logout::{
        AlwaysLogout, CentralLogout, CentralLogoutStrategy, LocalLogoutStrategy, NoCentralLogout,
        ProfilePresenceDependent,
    },
    save::{AllSavesSucceed, AnySaveSucceeds, SaveAggregation, SaveToSessionPolicy},
    session_renewal::{AlwaysRenew, NeverRenew, SessionRenewalStrategy},
};
