//! Type definitions for RelayGate configuration.
//!
//! Configuration is injected through small composable traits, so the core
//! never reads the process environment itself. The binary implements them
//! from environment variables; tests implement them with
//! `test_utils::TestConfig`.

use std::time::Duration;

use crate::defaults;

// ============================================================================
// Composable Configuration Traits
// ============================================================================

/// Configuration for upstream communication.
pub trait ProxyProvider: Send + Sync {
    /// Returns the proxy configuration.
    fn proxy_config(&self) -> &ProxyConfig;
}

/// Configuration for upstream service locations.
pub trait UpstreamProvider: Send + Sync {
    /// Returns the base URLs of the backend services.
    fn upstream_targets(&self) -> &UpstreamTargets;
}

/// Configuration for bearer-token verification.
pub trait AuthenticationProvider: Send + Sync {
    /// Returns the shared HMAC secret, if configured.
    fn jwt_secret(&self) -> Option<&str>;

    /// Returns true if a non-blank secret is configured.
    fn is_auth_configured(&self) -> bool {
        self.jwt_secret().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Configuration for connection limits.
pub trait ConnectionProvider: Send + Sync {
    /// Returns the maximum number of concurrent connections (0 = unlimited).
    fn max_connections(&self) -> usize;
}

/// Deployment environment settings.
pub trait RuntimeProvider: Send + Sync {
    /// Returns true when running in production.
    ///
    /// Outside production, internal error details are included in 500 bodies.
    fn is_production(&self) -> bool;
}

// ============================================================================
// ConfigProvider - Aggregated trait for full configuration
// ============================================================================

/// Trait for complete configuration injection.
///
/// Combines all specialized configuration traits into one. Any type
/// implementing every sub-trait is a `ConfigProvider`.
///
/// # Example
///
/// ```
/// use relaygate_core::{
///     AuthenticationProvider, ConnectionProvider, ProxyConfig, ProxyProvider,
///     RuntimeProvider, UpstreamProvider, UpstreamTargets,
/// };
/// use std::time::Duration;
///
/// struct MyConfig {
///     upstreams: UpstreamTargets,
/// }
///
/// impl ProxyProvider for MyConfig {
///     fn proxy_config(&self) -> &ProxyConfig {
///         static CONFIG: ProxyConfig = ProxyConfig {
///             timeout: Duration::from_secs(30),
///             max_body_size: 0,
///         };
///         &CONFIG
///     }
/// }
///
/// impl UpstreamProvider for MyConfig {
///     fn upstream_targets(&self) -> &UpstreamTargets { &self.upstreams }
/// }
///
/// impl AuthenticationProvider for MyConfig {
///     fn jwt_secret(&self) -> Option<&str> { Some("change-me") }
/// }
///
/// impl ConnectionProvider for MyConfig {
///     fn max_connections(&self) -> usize { 10_000 }
/// }
///
/// impl RuntimeProvider for MyConfig {
///     fn is_production(&self) -> bool { true }
/// }
/// ```
pub trait ConfigProvider:
    ProxyProvider + UpstreamProvider + AuthenticationProvider + ConnectionProvider + RuntimeProvider
{
}

// Blanket implementation: any type implementing all sub-traits is a ConfigProvider
impl<T> ConfigProvider for T where
    T: ProxyProvider
        + UpstreamProvider
        + AuthenticationProvider
        + ConnectionProvider
        + RuntimeProvider
{
}

/// Configuration for proxy behavior and upstream communication.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use relaygate_core::ProxyConfig;
///
/// let config = ProxyConfig {
///     timeout: Duration::from_secs(30),
///     max_body_size: ProxyConfig::mb_to_bytes(10),
/// };
///
/// assert!(config.is_valid());
/// assert_eq!(config.max_body_size_mb(), "10");
/// ```
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Timeout for upstream requests, from connect to the last response byte
    pub timeout: Duration,
    /// Maximum request body size in bytes (0 = unlimited)
    pub max_body_size: usize,
}

impl ProxyConfig {
    /// Returns `true` if the configuration is valid.
    ///
    /// A valid configuration has a non-zero timeout.
    pub fn is_valid(&self) -> bool {
        !self.timeout.is_zero()
    }

    /// Returns `true` if request bodies are size-limited.
    pub fn has_body_limit(&self) -> bool {
        self.max_body_size > 0
    }

    /// Returns the maximum body size formatted for display.
    pub fn max_body_size_mb(&self) -> String {
        if self.max_body_size == 0 {
            "unlimited".to_string()
        } else {
            (self.max_body_size / 1024 / 1024).to_string()
        }
    }

    /// Converts megabytes to bytes. Returns 0 (unlimited) for 0.
    ///
    /// Saturates at `usize::MAX`, so an oversized value stays a limit.
    pub fn mb_to_bytes(mb: usize) -> usize {
        mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::PROXY_TIMEOUT,
            max_body_size: Self::mb_to_bytes(defaults::MAX_BODY_SIZE_MB),
        }
    }
}

/// Base URLs of the backend services the gateway fronts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamTargets {
    /// Identity service (registration, login, token issuance).
    pub identity: String,
    /// Event service.
    pub event: String,
    /// Invitation service.
    pub invitation: String,
}

impl Default for UpstreamTargets {
    fn default() -> Self {
        Self {
            identity: defaults::AUTH_SERVICE_URL.to_string(),
            event: defaults::EVENT_SERVICE_URL.to_string(),
            invitation: defaults::INVITATION_SERVICE_URL.to_string(),
        }
    }
}
