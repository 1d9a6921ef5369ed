//! Server utilities for RelayGate.
//!
//! This module covers everything around the request pipeline: logging setup,
//! the startup banner, and the accept loop that serves each connection on its
//! own task until shutdown.

use std::future::Future;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::connection::{ConnectionLimiter, ConnectionTracker};
use crate::{args::Args, env_vars};
use relaygate_core::request_handler::{catch_panics, handle_request};
use relaygate_core::{ConfigProvider, GatewayState, defaults};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows the CLI flags.
pub fn init_tracing(args: &Args) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Print startup banner with configuration
pub fn print_startup_info(args: &Args, config: &impl ConfigProvider) {
    if args.quiet {
        // Quiet mode: only essential information
        println!(
            "🚀 RelayGate v{} starting on {}",
            env!("CARGO_PKG_VERSION"),
            args.listen_addr()
        );
        return;
    }

    // Normal/verbose mode: full configuration display
    println!("🛡️  {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("   {}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("📡 Network Configuration:");
    println!("   Listen:          {}", args.listen_addr());
    println!(
        "   Max Connections: {}",
        match config.max_connections() {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        }
    );
    println!();

    let upstreams = config.upstream_targets();
    println!("🔀 Routes:");
    println!("   {:<18} → {} (public)", defaults::AUTH_PREFIX, upstreams.identity);
    println!("   {:<18} → {} (bearer)", defaults::EVENT_PREFIX, upstreams.event);
    println!(
        "   {:<18} → {} (bearer)",
        defaults::INVITATION_PREFIX,
        upstreams.invitation
    );
    println!();

    let proxy_config = config.proxy_config();
    println!("🔧 Proxy Configuration:");
    println!("   Timeout:         {} seconds", proxy_config.timeout.as_secs());
    println!("   Max Body Size:   {} MB", proxy_config.max_body_size_mb());
    println!(
        "   Environment:     {}",
        if config.is_production() {
            "production"
        } else {
            "development"
        }
    );

    // Show environment configuration in verbose mode
    if args.verbose {
        print_env_config();
    }

    println!();
    println!("🚀 Server starting...");
}

/// Print environment variable configuration status (used in verbose mode)
fn print_env_config() {
    println!();
    println!("🔧 Environment Variables:");

    for &var_name in env_vars::all_env_vars() {
        match std::env::var(var_name) {
            Ok(value) => {
                println!("   {:<25} = {}", var_name, display_env_value(var_name, &value));
            }
            Err(_) => {
                println!("   {:<25} = [NOT SET]", var_name);
            }
        }
    }
}

/// Masks secret values for display.
fn display_env_value(var_name: &str, value: &str) -> String {
    if env_vars::SECRET_VARS.contains(&var_name) {
        "[CONFIGURED]".to_string()
    } else {
        value.to_string()
    }
}

/// Accepts connections until `shutdown` resolves, then drains.
///
/// Each admitted connection is served on its own task. Connections over the
/// limiter's cap are closed immediately. Once `shutdown` fires the listener
/// is dropped, open connections are asked to finish their in-flight exchange,
/// and this waits up to [`defaults::SHUTDOWN_GRACE`] for them.
///
/// Returns true if every connection drained in time.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<GatewayState>,
    limiter: ConnectionLimiter,
    shutdown: F,
) -> bool
where
    F: Future<Output = ()>,
{
    let tracker = ConnectionTracker::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(err) => {
                    warn!(error = %err, "Failed to accept connection");
                    continue;
                }
            },
            () = &mut shutdown => break,
        };

        let admission = limiter.try_admit();
        if !admission.is_admitted() {
            warn!(
                client = %addr,
                max = limiter.max_connections(),
                "Connection limit reached, closing connection"
            );
            continue;
        }

        debug!(client = %addr, "New connection");

        let guard = tracker.track();
        let state = Arc::clone(&state);
        let mut shutdown_rx = shutdown_rx.clone();

        tokio::spawn(async move {
            let _guard = guard;
            let _admission = admission;

            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move {
                    let production = state.is_production();
                    catch_panics(handle_request(req, &state), production).await
                }
            });

            let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
            tokio::pin!(conn);

            let result = tokio::select! {
                result = conn.as_mut() => result,
                _ = shutdown_rx.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.await
                }
            };

            if let Err(err) = result {
                debug!(client = %addr, error = %err, "Connection error");
            }
        });
    }

    drop(listener);
    let _ = shutdown_tx.send(true);

    let active = tracker.count();
    if active > 0 {
        info!(active, "Waiting for in-flight connections to finish");
    }

    let drained = tracker
        .wait_for_shutdown(defaults::SHUTDOWN_GRACE)
        .await;
    if !drained {
        warn!(
            remaining = tracker.count(),
            "Shutdown grace period elapsed with connections still open"
        );
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_env_values_are_masked() {
        assert_eq!(
            display_env_value(env_vars::JWT_SECRET, "hunter2"),
            "[CONFIGURED]"
        );
        assert_eq!(
            display_env_value(env_vars::AUTH_SERVICE_URL, "http://identity:3001"),
            "http://identity:3001"
        );
    }
}
