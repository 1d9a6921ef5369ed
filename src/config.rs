//! Configuration management for RelayGate.
//!
//! This module loads configuration from environment variables into an
//! immutable [`EnvVarConfig`] value. It is read once at startup and handed to
//! [`GatewayState::new`](relaygate_core::GatewayState::new); request handling
//! never touches the environment.
//!
//! The loader takes the variable lookup as a function, so tests can supply a
//! mock environment instead of mutating the process one.
//!
//! # Example
//!
//! ```no_run
//! use relaygate::config::EnvVarConfig;
//! use relaygate_core::ProxyProvider;
//!
//! let config = EnvVarConfig::from_env().expect("JWT_SECRET must be set");
//! println!("Timeout: {:?}", config.proxy_config().timeout);
//! ```

use std::env::VarError;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::env_vars;
use relaygate_core::{
    AuthenticationProvider, ConnectionProvider, GatewayError, ProxyConfig, ProxyProvider,
    RuntimeProvider, UpstreamProvider, UpstreamTargets, defaults,
};

// ============================================================================
// Internal Helpers
// ============================================================================

/// Parses an environment variable with fallback to a default value.
///
/// Logs a warning if the value exists but cannot be parsed.
fn parse_env_var_or_default<T, F>(env_var: &F, var_name: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Result<String, VarError>,
{
    match env_var(var_name) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = var_name, value = %value, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Reads a string variable, treating blank values as unset.
fn non_blank_env_var<F>(env_var: &F, var_name: &str) -> Option<String>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    env_var(var_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn compute_proxy_config<F>(env_var: &F) -> ProxyConfig
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let timeout_secs = parse_env_var_or_default(
        env_var,
        env_vars::PROXY_TIMEOUT_SECS,
        defaults::PROXY_TIMEOUT_SECS,
    );

    let max_body_mb = parse_env_var_or_default(
        env_var,
        env_vars::MAX_BODY_SIZE_MB,
        defaults::MAX_BODY_SIZE_MB,
    );

    let config = ProxyConfig {
        timeout: Duration::from_secs(timeout_secs),
        max_body_size: ProxyConfig::mb_to_bytes(max_body_mb),
    };

    if !config.is_valid() {
        warn!("Invalid proxy configuration, using default timeout");
        return ProxyConfig {
            timeout: defaults::PROXY_TIMEOUT,
            ..config
        };
    }

    config
}

fn compute_upstream_targets<F>(env_var: &F) -> UpstreamTargets
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let url = |var_name: &str, default: &str| {
        non_blank_env_var(env_var, var_name).unwrap_or_else(|| default.to_string())
    };

    UpstreamTargets {
        identity: url(env_vars::AUTH_SERVICE_URL, defaults::AUTH_SERVICE_URL),
        event: url(env_vars::EVENT_SERVICE_URL, defaults::EVENT_SERVICE_URL),
        invitation: url(
            env_vars::INVITATION_SERVICE_URL,
            defaults::INVITATION_SERVICE_URL,
        ),
    }
}

// ============================================================================
// EnvVarConfig - ConfigProvider implementation using environment variables
// ============================================================================

/// Configuration provider built from environment variables.
///
/// This is the configuration provider for the RelayGate CLI.
#[derive(Clone)]
pub struct EnvVarConfig {
    jwt_secret: String,
    upstreams: UpstreamTargets,
    proxy: ProxyConfig,
    max_connections: usize,
    production: bool,
}

impl EnvVarConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingSecret`] if `JWT_SECRET` is unset or blank.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_env_fn(|key| std::env::var(key))
    }

    /// Loads configuration through the given variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingSecret`] if `JWT_SECRET` is unset or blank.
    pub fn from_env_fn<F>(env_var: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        // Untrimmed: the secret is key material
        let jwt_secret = env_var(env_vars::JWT_SECRET)
            .ok()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(GatewayError::MissingSecret)?;

        let production = non_blank_env_var(&env_var, env_vars::GATEWAY_ENV)
            .is_some_and(|value| value.eq_ignore_ascii_case(env_vars::PRODUCTION));

        Ok(Self {
            jwt_secret,
            upstreams: compute_upstream_targets(&env_var),
            proxy: compute_proxy_config(&env_var),
            max_connections: parse_env_var_or_default(
                &env_var,
                env_vars::MAX_CONNECTIONS,
                defaults::MAX_CONNECTIONS,
            ),
            production,
        })
    }
}

impl std::fmt::Debug for EnvVarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvVarConfig")
            .field("jwt_secret", &"***")
            .field("upstreams", &self.upstreams)
            .field("proxy", &self.proxy)
            .field("max_connections", &self.max_connections)
            .field("production", &self.production)
            .finish()
    }
}

impl ProxyProvider for EnvVarConfig {
    fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy
    }
}

impl UpstreamProvider for EnvVarConfig {
    fn upstream_targets(&self) -> &UpstreamTargets {
        &self.upstreams
    }
}

impl AuthenticationProvider for EnvVarConfig {
    fn jwt_secret(&self) -> Option<&str> {
        Some(&self.jwt_secret)
    }
}

impl ConnectionProvider for EnvVarConfig {
    fn max_connections(&self) -> usize {
        self.max_connections
    }
}

impl RuntimeProvider for EnvVarConfig {
    fn is_production(&self) -> bool {
        self.production
    }
}
