//! Shared keys and defaults used across the engine.

/// Session and request-attribute key holding the ordered profile store.
pub const USER_PROFILES: &str = "palisade.userProfiles";

/// Session key holding the originally requested URL while an indirect login
/// round trip is in flight.
pub const REQUESTED_URL: &str = "palisade.requestedUrl";

/// CSRF token name, shared between the session key, the request parameter,
/// the request header, the request attribute and the cookie.
pub const CSRF_TOKEN: &str = "palisadeCsrfToken";

/// Request parameter naming the client targeted by the current request.
pub const DEFAULT_CLIENT_NAME_PARAMETER: &str = "client_name";

/// Profile-store key used when a profile carries no originating client name.
pub const DEFAULT_PROFILE_KEY: &str = "DEFAULT";

/// Separator for client, authorizer and matcher name lists.
pub const ELEMENT_SEPARATOR: char = ',';

/// Request parameter naming the post-logout redirect target.
pub const LOGOUT_URL_PARAMETER: &str = "url";

/// Default allow-pattern for the post-logout redirect target: relative URLs.
pub const DEFAULT_LOGOUT_URL_PATTERN: &str = "/.*";
