//! Bearer token verification.
//!
//! Tokens are HMAC-signed JWTs issued by the identity service with the shape
//! `{ "user": { "userId", "email" }, "iat", "exp" }`. The gateway only ever
//! verifies them; it never issues or re-signs one.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use super::{AuthContext, AuthError};

/// Scheme prefix expected in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// HMAC algorithms accepted for signatures.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// User claims embedded by the identity service.
#[derive(Debug, Deserialize)]
struct TokenUser {
    #[serde(rename = "userId")]
    user_id: String,
    email: String,
}

/// Claims carried by a gateway bearer token.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    user: TokenUser,
    // Checked by `Validation`; kept here so a token without it fails to decode.
    #[allow(dead_code)]
    exp: u64,
}

/// Verifies bearer tokens against the shared secret.
///
/// Holds only immutable key material and is safe to share across tasks.
///
/// # Example
///
/// ```
/// use relaygate_core::auth::{AuthError, TokenVerifier};
///
/// let verifier = TokenVerifier::new(Some("shared-secret"));
/// assert_eq!(verifier.verify(None), Err(AuthError::MissingOrMalformedHeader));
/// assert_eq!(verifier.verify(Some("Basic abc")), Err(AuthError::MissingOrMalformedHeader));
/// assert_eq!(verifier.verify(Some("Bearer not-a-jwt")), Err(AuthError::InvalidSignature));
/// ```
#[derive(Clone)]
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a verifier. A missing or blank secret yields a verifier that
    /// rejects every token with [`AuthError::ServerMisconfigured`].
    pub fn new(secret: Option<&str>) -> Self {
        let key = secret
            .filter(|s| !s.trim().is_empty())
            .map(|s| DecodingKey::from_secret(s.as_bytes()));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;

        Self { key, validation }
    }

    /// Returns true if a secret is configured.
    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Verifies the value of an `Authorization` header.
    ///
    /// The signature is checked before expiry, so a token signed with another
    /// secret is always [`AuthError::InvalidSignature`] whatever its claims.
    pub fn verify(&self, authorization: Option<&str>) -> Result<AuthContext, AuthError> {
        let token = authorization
            .and_then(|header| header.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingOrMalformedHeader)?;

        let key = self.key.as_ref().ok_or(AuthError::ServerMisconfigured)?;

        let data = decode::<TokenClaims>(token, key, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidSignature,
            }
        })?;

        Ok(AuthContext {
            user_id: data.claims.user.user_id,
            email: data.claims.user.email,
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}
