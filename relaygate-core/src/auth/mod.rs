//! Bearer-token authentication.
//!
//! [`TokenVerifier`] checks a single `Authorization` header value;
//! [`authenticate`] is the gate in the request pipeline that decides, from a
//! classified route, whether verification runs at all.

pub mod token;

use hyper::HeaderMap;
use hyper::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::headers;
use crate::routing::RouteMatch;

pub use token::{BEARER_PREFIX, TokenVerifier};

/// Reason a bearer token was rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Header absent or not of the form `Bearer <token>`.
    #[error("missing or malformed authorization header")]
    MissingOrMalformedHeader,

    /// Signature mismatch, malformed token or disallowed algorithm.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Correctly signed token past its expiry.
    #[error("token expired")]
    Expired,

    /// No verification secret configured.
    #[error("verification secret not configured")]
    ServerMisconfigured,
}

impl AuthError {
    /// Returns the HTTP status code for this rejection.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerMisconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns the message sent to the client.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingOrMalformedHeader => "No token provided",
            Self::InvalidSignature => "Invalid token",
            Self::Expired => "Token expired",
            Self::ServerMisconfigured => "Server misconfigured",
        }
    }
}

/// Identity claims of an authenticated request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthContext {
    /// `user.userId` claim.
    pub user_id: String,
    /// `user.email` claim.
    pub email: String,
}

/// Result of running the gate over a classified request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Route is public; no verification attempted.
    Skip,
    /// Token verified.
    Authenticated(AuthContext),
    /// Token rejected; the request must not be forwarded.
    Rejected(AuthError),
}

impl AuthOutcome {
    /// Returns the auth context to thread into forwarding, or the rejection.
    pub fn into_context(self) -> Result<Option<AuthContext>, AuthError> {
        match self {
            Self::Skip => Ok(None),
            Self::Authenticated(ctx) => Ok(Some(ctx)),
            Self::Rejected(err) => Err(err),
        }
    }
}

/// Runs bearer authentication for a matched route.
///
/// Public routes return [`AuthOutcome::Skip`] without touching the headers.
pub fn authenticate(route: &RouteMatch, headers: &HeaderMap, verifier: &TokenVerifier) -> AuthOutcome {
    if !route.auth_required {
        debug!(service = %route.service, "Public route, skipping authentication");
        return AuthOutcome::Skip;
    }

    let authorization = headers
        .get(headers::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match verifier.verify(authorization) {
        Ok(ctx) => {
            debug!(service = %route.service, user_id = %ctx.user_id, "Token verified");
            AuthOutcome::Authenticated(ctx)
        }
        Err(err) => {
            warn!(service = %route.service, reason = %err, "Rejected request");
            AuthOutcome::Rejected(err)
        }
    }
}
