//! Command line argument parsing for RelayGate.
//!
//! This module defines the CLI interface using [`clap`] for argument parsing.
//! It covers the listening address and output verbosity; everything about
//! upstreams and authentication comes from the environment (see
//! [`crate::env_vars`]).
//!
//! # Example
//!
//! ```no_run
//! use relaygate::args::Args;
//! use clap::Parser;
//!
//! let args = Args::parse();
//! if let Err(e) = args.validate() {
//!     eprintln!("Configuration error: {}", e);
//!     std::process::exit(1);
//! }
//! ```

use clap::Parser;

/// Default listen port.
pub const DEFAULT_LISTEN_PORT: u16 = 3000;

/// Command line arguments for RelayGate.
///
/// # Fields
///
/// * `bind` - Address to bind for listening (default: "0.0.0.0")
/// * `listen` - Port to listen on for incoming requests (default: 3000)
/// * `verbose` - Enable detailed configuration output and debug logs
/// * `quiet` - Suppress non-essential output (conflicts with verbose)
/// * `json_logs` - Output logs in JSON format for structured logging
#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(
    long_about = "A single entry point for the identity, event and invitation services.\nVerifies bearer tokens on protected routes and relays everything else untouched.\n\nExample usage:\n  JWT_SECRET=change-me relaygate --listen 3000\n  JWT_SECRET=change-me relaygate -l 8080 --verbose"
)]
#[command(
    after_help = "Environment variables:\n  JWT_SECRET              Shared token secret (required)\n  AUTH_SERVICE_URL        Identity service (default: http://localhost:3001)\n  EVENT_SERVICE_URL       Event service (default: http://localhost:3002)\n  INVITATION_SERVICE_URL  Invitation service (default: http://localhost:3003)\n  PROXY_TIMEOUT_SECS      Upstream timeout in seconds (default: 30)\n  MAX_BODY_SIZE_MB        Request body limit, 0 = unlimited (default: 0)\n  MAX_CONNECTIONS         Concurrent connections, 0 = unlimited (default: 10000)\n  GATEWAY_ENV             'production' hides internal error details"
)]
pub struct Args {
    /// Address to bind to
    #[arg(
        long,
        short = 'b',
        help = "Bind address for incoming connections",
        value_name = "ADDRESS",
        default_value = "0.0.0.0"
    )]
    pub bind: String,

    /// Port to listen on for incoming requests
    #[arg(
        long,
        short = 'l',
        help = "Listen port for incoming connections",
        value_name = "PORT",
        default_value_t = DEFAULT_LISTEN_PORT
    )]
    pub listen: u16,

    /// Enable verbose output
    #[arg(
        long,
        short = 'v',
        help = "Show detailed configuration and startup information"
    )]
    pub verbose: bool,

    /// Enable quiet mode (minimal output)
    #[arg(
        long,
        short = 'q',
        help = "Suppress configuration output, show only essential messages",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output logs in JSON format (for structured logging)
    #[arg(long, help = "Output logs in JSON format for structured logging")]
    pub json_logs: bool,
}

impl Args {
    /// Validates the parsed command line arguments.
    ///
    /// - The listen port must be greater than 0
    /// - The bind address must be a valid IP address
    ///
    /// # Example
    ///
    /// ```
    /// use relaygate::args::Args;
    /// use clap::Parser;
    ///
    /// let args = Args::try_parse_from(["relaygate", "-l", "0"]).unwrap();
    /// assert!(args.validate().is_err());
    ///
    /// let args = Args::try_parse_from(["relaygate"]).unwrap();
    /// assert_eq!(args.listen, 3000);
    /// assert!(args.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.listen == 0 {
            return Err("Listen port must be greater than 0".to_string());
        }

        if self.bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address: '{}'", self.bind));
        }

        Ok(())
    }

    /// Returns the socket address to listen on.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.listen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["relaygate"]).unwrap();
        assert_eq!(args.bind, "0.0.0.0");
        assert_eq!(args.listen, DEFAULT_LISTEN_PORT);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(!args.json_logs);
        assert_eq!(args.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from(["relaygate", "-b", "127.0.0.1", "-l", "8080", "-v"]).unwrap();
        assert_eq!(args.listen_addr(), "127.0.0.1:8080");
        assert!(args.verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["relaygate", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_invalid_bind_address() {
        let args = Args::try_parse_from(["relaygate", "-b", "not-an-ip"]).unwrap();
        assert_eq!(
            args.validate(),
            Err("Invalid bind address: 'not-an-ip'".to_string())
        );
    }

    #[test]
    fn test_ipv6_bind_address() {
        let args = Args::try_parse_from(["relaygate", "-b", "::1"]).unwrap();
        assert!(args.validate().is_ok());
    }
}
