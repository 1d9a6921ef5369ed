//! Environment variable names used throughout RelayGate configuration

/// Authentication
pub const JWT_SECRET: &str = "JWT_SECRET";

/// Upstream service locations
pub const AUTH_SERVICE_URL: &str = "AUTH_SERVICE_URL";
pub const EVENT_SERVICE_URL: &str = "EVENT_SERVICE_URL";
pub const INVITATION_SERVICE_URL: &str = "INVITATION_SERVICE_URL";

/// Proxy behavior configuration
pub const PROXY_TIMEOUT_SECS: &str = "PROXY_TIMEOUT_SECS";
pub const MAX_BODY_SIZE_MB: &str = "MAX_BODY_SIZE_MB";

/// Connection limits
pub const MAX_CONNECTIONS: &str = "MAX_CONNECTIONS";

/// Deployment environment
pub const GATEWAY_ENV: &str = "GATEWAY_ENV";

/// Value of [`GATEWAY_ENV`] that enables production mode.
pub const PRODUCTION: &str = "production";

/// Variables whose values must never be printed.
pub const SECRET_VARS: &[&str] = &[JWT_SECRET];

/// Get all environment variable names for documentation/validation
pub fn all_env_vars() -> &'static [&'static str] {
    &[
        JWT_SECRET,
        AUTH_SERVICE_URL,
        EVENT_SERVICE_URL,
        INVITATION_SERVICE_URL,
        PROXY_TIMEOUT_SECS,
        MAX_BODY_SIZE_MB,
        MAX_CONNECTIONS,
        GATEWAY_ENV,
    ]
}
