//! RelayGate Core - Reusable API gateway components
//!
//! This crate provides the core functionality for fronting a set of backend
//! services behind a single HTTP entry point:
//! - Prefix-based route classification with path rewriting
//! - Bearer-token (HMAC JWT) verification for protected routes
//! - Streaming request forwarding with upstream response passthrough
//!
//! # Overview
//!
//! `relaygate-core` is framework-agnostic beyond hyper's request and response
//! types. Configuration is provided via the [`ConfigProvider`] trait, allowing
//! flexible configuration from any source. Everything built from it is
//! immutable and shared across requests without locks.
//!
//! # Example
//!
//! ```rust,no_run
//! use relaygate_core::{
//!     AuthenticationProvider, ConnectionProvider, ProxyConfig, ProxyProvider,
//!     RuntimeProvider, UpstreamProvider, UpstreamTargets,
//!     request_handler::GatewayState,
//! };
//!
//! struct MyConfig {
//!     proxy: ProxyConfig,
//!     upstreams: UpstreamTargets,
//! }
//!
//! impl ProxyProvider for MyConfig {
//!     fn proxy_config(&self) -> &ProxyConfig { &self.proxy }
//! }
//!
//! impl UpstreamProvider for MyConfig {
//!     fn upstream_targets(&self) -> &UpstreamTargets { &self.upstreams }
//! }
//!
//! impl AuthenticationProvider for MyConfig {
//!     fn jwt_secret(&self) -> Option<&str> { Some("change-me") }
//! }
//!
//! impl ConnectionProvider for MyConfig {
//!     fn max_connections(&self) -> usize { 10_000 }
//! }
//!
//! impl RuntimeProvider for MyConfig {
//!     fn is_production(&self) -> bool { false }
//! }
//!
//! let config = MyConfig {
//!     proxy: ProxyConfig::default(),
//!     upstreams: UpstreamTargets::default(),
//! };
//! let state = GatewayState::new(&config).expect("valid configuration");
//! ```
//!
//! # Modules
//!
//! - [`types`] - Configuration types and the [`ConfigProvider`] trait
//! - [`error`] - Error types and result aliases
//! - [`headers`] - HTTP header constants
//! - [`defaults`] - Default configuration values
//! - [`routing`] - Route table and request classification
//! - [`auth`] - Bearer token verification and the auth gate
//! - [`proxy`] - Streaming upstream forwarding
//! - [`request_handler`] - The per-request pipeline

#![forbid(unsafe_code)]

pub mod auth;
pub mod defaults;
pub mod error;
pub mod headers;
pub mod proxy;
pub mod request_handler;
pub mod routing;
#[cfg(test)]
pub mod test_utils;
pub mod types;

// Re-export commonly used items at crate root
pub use auth::{AuthContext, AuthError, TokenVerifier};
pub use error::{GatewayError, Result};
pub use proxy::{GatewayBody, ProxyForwarder};
pub use request_handler::GatewayState;
pub use routing::{PathRewrite, RouteMatch, RouteRule, RouteTable, RoutingDecision};
pub use types::{
    // Composable configuration traits
    AuthenticationProvider,
    // Aggregated configuration trait
    ConfigProvider,
    ConnectionProvider,
    // Configuration structs
    ProxyConfig,
    ProxyProvider,
    RuntimeProvider,
    UpstreamProvider,
    UpstreamTargets,
};
