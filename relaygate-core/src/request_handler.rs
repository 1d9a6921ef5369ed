//! HTTP request handling.
//!
//! This module wires the gateway pipeline together. Each request moves
//! through strictly sequential stages, and each stage's input is visible in
//! its signature:
//!
//! 1. `GET /health` is answered locally, before classification
//! 2. The path is classified against the [`RouteTable`]; no match → `404`
//! 3. Protected routes pass through the auth gate; rejection → `401`
//! 4. The request is forwarded and the upstream response relayed
//!
//! Every path through [`handle_request`] yields exactly one response.
//! Nothing outlives the exchange. [`catch_panics`] extends that to a handler
//! that panics: the client gets a `500` instead of a dropped connection.

use std::any::Any;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use bytes::Bytes;
use futures_util::FutureExt;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;
use tracing::{debug, error};

use crate::auth::{self, TokenVerifier};
use crate::defaults;
use crate::error::{GatewayError, Result};
use crate::headers;
use crate::proxy::{GatewayBody, ProxyForwarder, full_body};
use crate::routing::{RouteTable, RoutingDecision};
use crate::types::ConfigProvider;

/// Immutable state shared by every request.
///
/// Built once at startup and read concurrently without locks.
#[derive(Debug)]
pub struct GatewayState {
    routes: RouteTable,
    verifier: TokenVerifier,
    forwarder: ProxyForwarder,
    production: bool,
}

impl GatewayState {
    /// Builds the gateway state from configuration.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::MissingSecret`] if no verification secret is configured
    /// - [`GatewayError::ConfigError`] if an upstream URL or the proxy settings are invalid
    pub fn new(config: &impl ConfigProvider) -> Result<Self> {
        if !config.is_auth_configured() {
            return Err(GatewayError::MissingSecret);
        }

        Ok(Self {
            routes: RouteTable::standard(config.upstream_targets())?,
            verifier: TokenVerifier::new(config.jwt_secret()),
            forwarder: ProxyForwarder::new(config.proxy_config())?,
            production: config.is_production(),
        })
    }

    /// Assembles state from prebuilt parts.
    pub fn from_parts(
        routes: RouteTable,
        verifier: TokenVerifier,
        forwarder: ProxyForwarder,
        production: bool,
    ) -> Self {
        Self {
            routes,
            verifier,
            forwarder,
            production,
        }
    }

    /// Returns the route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Returns true if internal error details are hidden from clients.
    pub fn is_production(&self) -> bool {
        self.production
    }
}

/// Handles an incoming HTTP request through the gateway pipeline.
///
/// Always returns `Ok`: failures become JSON error responses, and upstream
/// responses (errors included) are relayed unchanged.
pub async fn handle_request<B>(
    req: Request<B>,
    state: &GatewayState,
) -> std::result::Result<Response<GatewayBody>, Infallible>
where
    B: Body<Data = Bytes> + Send + Sync + Unpin + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    if req.method() == Method::GET && req.uri().path() == defaults::HEALTH_PATH {
        return Ok(health_response());
    }

    let route = match state.routes.classify(req.uri().path()) {
        RoutingDecision::Matched(route) => route,
        RoutingDecision::NotFound => {
            debug!(method = %req.method(), path = %req.uri().path(), "No route matched");
            let err = GatewayError::RouteNotFound(req.uri().path().to_string());
            return Ok(error_to_response(&err, state.production));
        }
    };

    debug!(
        method = %req.method(),
        path = %req.uri().path(),
        service = %route.service,
        rewritten = %route.rewritten_path,
        "Classified request"
    );

    let auth = match auth::authenticate(&route, req.headers(), &state.verifier).into_context() {
        Ok(auth) => auth,
        Err(err) => return Ok(error_to_response(&err.into(), state.production)),
    };

    match state.forwarder.forward(req, &route, auth.as_ref()).await {
        Ok(response) => Ok(response),
        Err(err) => {
            if err.is_server_error() {
                error!(service = %route.service, error = %err, "Failed to forward request");
            } else {
                debug!(service = %route.service, error = %err, "Request refused");
            }
            Ok(error_to_response(&err, state.production))
        }
    }
}

/// Drives a response future, turning a panic into a `500` response.
///
/// The panic message becomes the [`GatewayError::Internal`] detail, shown to
/// the client only outside production.
pub async fn catch_panics<F>(
    future: F,
    production: bool,
) -> std::result::Result<Response<GatewayBody>, Infallible>
where
    F: Future<Output = std::result::Result<Response<GatewayBody>, Infallible>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let err = GatewayError::Internal(panic_message(payload.as_ref()));
            error!(error = %err, "Request handler panicked");
            Ok(error_to_response(&err, production))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "request handler panicked".to_string()
    }
}

/// Builds the local health check response.
pub fn health_response() -> Response<GatewayBody> {
    json_response(StatusCode::OK, &json!({ "status": "ok" }))
}

/// Creates a standardized JSON error response: `{"message": "..."}`.
///
/// # Example
///
/// ```
/// use relaygate_core::request_handler::create_error_response;
/// use hyper::StatusCode;
///
/// let response = create_error_response(StatusCode::NOT_FOUND, "Not found");
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// assert_eq!(response.headers()["content-type"], "application/json");
/// ```
pub fn create_error_response(status: StatusCode, message: &str) -> Response<GatewayBody> {
    json_response(status, &json!({ "message": message }))
}

/// Creates the `500` response for failures inside the gateway.
///
/// Outside production the error detail is added under `"error"`.
pub fn internal_error_response(err: &GatewayError, production: bool) -> Response<GatewayBody> {
    let status = err.status_code();
    if production {
        create_error_response(status, err.user_message())
    } else {
        json_response(
            status,
            &json!({ "message": err.user_message(), "error": err.to_string() }),
        )
    }
}

/// Maps a gateway error to its client response.
pub fn error_to_response(err: &GatewayError, production: bool) -> Response<GatewayBody> {
    if err.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
        internal_error_response(err, production)
    } else {
        create_error_response(err.status_code(), err.user_message())
    }
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<GatewayBody> {
    Response::builder()
        .status(status)
        .header(headers::CONTENT_TYPE, headers::APPLICATION_JSON)
        .body(full_body(body.to_string()))
        .unwrap_or_else(|_| {
            // Fallback response if builder fails (extremely unlikely)
            let mut response = Response::new(full_body("Internal Server Error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}
