//! Default configuration values for RelayGate.
//!
//! Shared by the environment loader and the tests so both agree on what an
//! unconfigured gateway looks like.

use std::time::Duration;

/// Default upstream timeout in seconds.
pub const PROXY_TIMEOUT_SECS: u64 = 30;

/// Default upstream timeout duration.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(PROXY_TIMEOUT_SECS);

/// Default maximum request body size in megabytes (0 = unlimited).
pub const MAX_BODY_SIZE_MB: usize = 0;

/// Default maximum concurrent connections.
pub const MAX_CONNECTIONS: usize = 10_000;

/// Default identity service base URL.
pub const AUTH_SERVICE_URL: &str = "http://localhost:3001";

/// Default event service base URL.
pub const EVENT_SERVICE_URL: &str = "http://localhost:3002";

/// Default invitation service base URL.
pub const INVITATION_SERVICE_URL: &str = "http://localhost:3003";

/// External prefix routed to the identity service.
pub const AUTH_PREFIX: &str = "/api/auth";

/// External prefix routed to the event service.
pub const EVENT_PREFIX: &str = "/api/events";

/// External prefix routed to the invitation service.
pub const INVITATION_PREFIX: &str = "/api/invitations";

/// Path answered locally by the gateway.
pub const HEALTH_PATH: &str = "/health";

/// Grace period for in-flight connections on shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);
