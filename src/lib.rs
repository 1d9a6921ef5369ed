//! RelayGate - A single front door for a set of backend services
//!
//! An API gateway that classifies requests by path prefix, verifies bearer
//! tokens on protected routes, and streams everything to the right upstream.
//!
//! # Overview
//!
//! RelayGate fronts three services:
//! - `/api/auth/*` → identity service, public, path unchanged
//! - `/api/events*` → event service, bearer token required, `/api` stripped
//! - `/api/invitations*` → invitation service, bearer token required,
//!   rewritten to `/api/*`
//!
//! Upstream responses, errors included, are relayed unchanged. The gateway
//! only answers on its own for `GET /health`, unknown paths, rejected tokens
//! and upstream transport failures.
//!
//! # Example
//!
//! ```rust,no_run
//! use relaygate::config::EnvVarConfig;
//! use relaygate_core::GatewayState;
//!
//! let config = EnvVarConfig::from_env().expect("JWT_SECRET must be set");
//! let state = GatewayState::new(&config).expect("valid upstream URLs");
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration management from environment variables
//! - [`env_vars`] - Environment variable constants
//! - [`server`] - Accept loop, logging setup and startup info
//! - [`connection`] - Connection limiting and shutdown tracking
//! - [`args`] - Command line argument parsing
//!
//! # Re-exports from relaygate-core
//!
//! Core functionality is provided by the `relaygate-core` crate:
//! - [`auth`] - Bearer token verification and the auth gate
//! - [`routing`] - Route table and request classification
//! - [`proxy`] - Streaming upstream forwarding
//! - [`request_handler`] - The per-request pipeline

#![forbid(unsafe_code)]

pub mod args;
pub mod config;
pub mod connection;
pub mod env_vars;
pub mod server;

// Re-export relaygate-core modules
pub use relaygate_core::auth;
pub use relaygate_core::proxy;
pub use relaygate_core::request_handler;
pub use relaygate_core::routing;
pub use relaygate_core::types;

// Re-export commonly used items at crate root
pub use config::EnvVarConfig;
pub use relaygate_core::{
    // Aggregated configuration trait
    ConfigProvider,
    // Gateway state and errors
    GatewayError,
    GatewayState,
    // Configuration structs
    ProxyConfig,
    UpstreamTargets,
};
