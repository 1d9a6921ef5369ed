//! Test utilities for RelayGate.
//!
//! This module provides shared test configuration types used across unit tests.
//! It is only compiled when running tests (`#[cfg(test)]`).

use crate::types::{
    AuthenticationProvider, ConnectionProvider, ProxyConfig, ProxyProvider, RuntimeProvider,
    UpstreamProvider, UpstreamTargets,
};
use std::time::Duration;

/// Secret used by [`TestConfig`] unless overridden.
pub const TEST_SECRET: &str = "relaygate-test-secret";

/// Shared test configuration for unit tests.
///
/// This struct implements all configuration traits with sensible defaults
/// and builder methods for customization.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub proxy: ProxyConfig,
    pub upstreams: UpstreamTargets,
    pub jwt_secret: Option<String>,
    pub max_connections: usize,
    pub production: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            proxy: ProxyConfig::default(),
            upstreams: UpstreamTargets::default(),
            jwt_secret: Some(TEST_SECRET.to_string()),
            max_connections: 10_000,
            production: false,
        }
    }
}

impl TestConfig {
    /// Create a new test configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configured secret, or an empty string.
    pub fn secret(&self) -> String {
        self.jwt_secret.clone().unwrap_or_default()
    }

    /// Configure the verification secret.
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.jwt_secret = Some(secret.to_string());
        self
    }

    /// Remove the verification secret.
    pub fn without_secret(mut self) -> Self {
        self.jwt_secret = None;
        self
    }

    /// Configure the upstream base URLs.
    pub fn with_upstreams(mut self, identity: &str, event: &str, invitation: &str) -> Self {
        self.upstreams = UpstreamTargets {
            identity: identity.to_string(),
            event: event.to_string(),
            invitation: invitation.to_string(),
        };
        self
    }

    /// Configure the upstream timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.proxy.timeout = timeout;
        self
    }

    /// Configure the maximum body size in bytes.
    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.proxy.max_body_size = bytes;
        self
    }

    /// Mark the configuration as production.
    pub fn production(mut self) -> Self {
        self.production = true;
        self
    }
}

impl ProxyProvider for TestConfig {
    fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy
    }
}

impl UpstreamProvider for TestConfig {
    fn upstream_targets(&self) -> &UpstreamTargets {
        &self.upstreams
    }
}

impl AuthenticationProvider for TestConfig {
    fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref()
    }
}

impl ConnectionProvider for TestConfig {
    fn max_connections(&self) -> usize {
        self.max_connections
    }
}

impl RuntimeProvider for TestConfig {
    fn is_production(&self) -> bool {
        self.production
    }
}
