use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use relaygate::args::Args;
use relaygate::config::EnvVarConfig;
use relaygate::connection::ConnectionLimiter;
use relaygate::server;
use relaygate_core::{ConnectionProvider, GatewayState};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Configuration error: {err}");
        std::process::exit(1);
    }

    server::init_tracing(&args);

    // Load configuration once; refuse to start without a secret
    let config = match EnvVarConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ Configuration error: {err}");
            std::process::exit(1);
        }
    };

    let state = match GatewayState::new(&config) {
        Ok(state) => Arc::new(state),
        Err(err) => {
            eprintln!("❌ Configuration error: {err}");
            std::process::exit(1);
        }
    };

    server::print_startup_info(&args, &config);

    let listener = match TcpListener::bind(args.listen_addr()).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ Failed to bind to {}: {}", args.listen_addr(), err);
            std::process::exit(1);
        }
    };

    println!("✅ RelayGate is running on {}", args.listen_addr());
    info!(addr = %args.listen_addr(), "Listening");

    let limiter = ConnectionLimiter::new(config.max_connections());
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, draining connections");
    };

    if server::serve(listener, state, limiter, shutdown).await {
        info!("Shutdown complete");
    } else {
        std::process::exit(1);
    }
}
