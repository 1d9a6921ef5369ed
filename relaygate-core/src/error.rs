//! Error types for RelayGate.
//!
//! This module provides a unified error type for gateway operations. Errors
//! produced by upstream services are never represented here: their responses
//! are relayed to the client untouched.

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias for RelayGate operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Unified error type for RelayGate operations.
///
/// # Example
///
/// ```
/// use relaygate_core::error::{GatewayError, Result};
///
/// fn require_secret(secret: Option<&str>) -> Result<&str> {
///     secret.ok_or(GatewayError::MissingSecret)
/// }
///
/// assert!(require_secret(None).is_err());
/// ```
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error (missing or invalid values).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No verification secret configured.
    #[error("Configuration error: JWT secret is not configured")]
    MissingSecret,

    /// Bearer token rejected.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// No route matched the request path.
    #[error("No route for path: {0}")]
    RouteNotFound(String),

    /// Upstream connection failed.
    #[error("Upstream connection failed: {0}")]
    UpstreamConnectionFailed(String),

    /// Upstream request timed out.
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Any other transport failure while talking to the upstream.
    #[error("Proxy error: {0}")]
    ProxyError(String),

    /// Request body exceeds the configured limit.
    #[error("Request body too large (max: {max} bytes)")]
    BodyTooLarge {
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// HTTP client construction or usage error (from reqwest).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    /// Failure inside the gateway itself.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the HTTP status code that should be returned to the client.
    pub fn status_code(&self) -> hyper::StatusCode {
        use hyper::StatusCode;

        match self {
            Self::ConfigError(_) | Self::MissingSecret => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => err.status_code(),
            Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamConnectionFailed(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::ProxyError(_) => StatusCode::BAD_GATEWAY,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::HttpClientError(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message placed in the JSON body sent to the client.
    ///
    /// This never exposes internal details; see
    /// [`crate::request_handler::internal_error_response`] for the
    /// development-mode variant.
    pub fn user_message(&self) -> &str {
        match self {
            Self::ConfigError(_) | Self::Internal(_) => "Internal server error",
            Self::MissingSecret => "Server misconfigured",
            Self::Auth(err) => err.user_message(),
            Self::RouteNotFound(_) => "Not found",
            Self::UpstreamConnectionFailed(_) => "Could not connect to upstream service",
            Self::UpstreamTimeout(_) => "Upstream service timeout",
            Self::ProxyError(_) | Self::HttpClientError(_) => "Upstream service error",
            Self::BodyTooLarge { .. } => "Request body too large",
        }
    }

    /// Returns true if this error should be logged at error level.
    ///
    /// Client-caused failures (bad tokens, unknown paths) are expected and
    /// only logged at debug/warn level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_)
                | Self::MissingSecret
                | Self::UpstreamConnectionFailed(_)
                | Self::UpstreamTimeout(_)
                | Self::ProxyError(_)
                | Self::HttpClientError(_)
                | Self::Internal(_)
        ) || matches!(self, Self::Auth(AuthError::ServerMisconfigured))
    }
}
