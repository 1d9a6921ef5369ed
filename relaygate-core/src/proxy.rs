//! Streaming request forwarding.
//!
//! The request body is handed to the upstream as a stream and the upstream
//! response body is relayed the same way, so neither is ever held in memory
//! in full. Status, headers and body come back untouched; only hop-by-hop
//! headers are dropped.
//!
//! # Connection Pooling
//!
//! [`ProxyForwarder`] owns a single [`reqwest::Client`], so connections to
//! each upstream are pooled across requests. The client's timeout bounds the
//! whole exchange, from connect to the last byte of the response.
//!
//! # Cancellation
//!
//! If the client goes away, hyper drops the pending service future (or the
//! streaming response body), which drops the in-flight upstream request and
//! closes its connection.

use std::error::Error as StdError;
use std::io;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited, StreamBody};
use hyper::body::{Body, Frame};
use hyper::{HeaderMap, Request, Response};
use tracing::debug;

use crate::auth::AuthContext;
use crate::error::{GatewayError, Result};
use crate::headers;
use crate::routing::RouteMatch;
use crate::types::ProxyConfig;

/// Response body type produced by the gateway.
///
/// `UnsyncBoxBody` because the relayed upstream stream is `Send` but not
/// `Sync`; hyper only requires `Send + 'static`.
pub type GatewayBody = UnsyncBoxBody<Bytes, io::Error>;

/// Wraps a fully buffered payload into [`GatewayBody`].
pub fn full_body(bytes: impl Into<Bytes>) -> GatewayBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Forwards classified requests to their upstream.
#[derive(Clone, Debug)]
pub struct ProxyForwarder {
    client: reqwest::Client,
    body_limit: Option<usize>,
}

impl ProxyForwarder {
    /// Creates a forwarder with a pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] for an invalid configuration, or
    /// [`GatewayError::HttpClientError`] if the client cannot be built.
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        if !config.is_valid() {
            return Err(GatewayError::ConfigError(
                "proxy timeout must be greater than zero".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            body_limit: config.has_body_limit().then_some(config.max_body_size),
        })
    }

    /// Forwards `req` to the route's upstream and relays the response.
    ///
    /// `auth` is the verified identity for protected routes; it is recorded in
    /// logs only. The original `Authorization` header travels to the upstream
    /// unmodified.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::BodyTooLarge`] when a body limit is configured and exceeded
    /// - [`GatewayError::UpstreamTimeout`] when the upstream does not answer in time
    /// - [`GatewayError::UpstreamConnectionFailed`] when the upstream is unreachable
    /// - [`GatewayError::ProxyError`] for any other transport failure
    pub async fn forward<B>(
        &self,
        req: Request<B>,
        route: &RouteMatch,
        auth: Option<&AuthContext>,
    ) -> Result<Response<GatewayBody>>
    where
        B: Body<Data = Bytes> + Send + Sync + Unpin + 'static,
        B::Error: Into<Box<dyn StdError + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        if let Some(max) = self.body_limit
            && content_length(&parts.headers).is_some_and(|len| len > max)
        {
            return Err(GatewayError::BodyTooLarge { max });
        }

        let url = route.upstream_url(parts.uri.query());
        debug!(
            method = %parts.method,
            service = %route.service,
            upstream = %url,
            user_id = auth.map(|a| a.user_id.as_str()),
            "Forwarding request"
        );

        let mut builder = self
            .client
            .request(parts.method, &url)
            .headers(forwarded_request_headers(&parts.headers));

        if !body.is_end_stream() {
            let limit = self.body_limit.unwrap_or(usize::MAX);
            let stream = Limited::new(body, limit).into_data_stream();
            builder = builder.body(reqwest::Body::wrap_stream(stream));
        }

        let upstream = builder
            .send()
            .await
            .map_err(|err| self.map_send_error(err, &route.service))?;

        Ok(relay_response(upstream))
    }

    fn map_send_error(&self, err: reqwest::Error, service: &str) -> GatewayError {
        if let Some(max) = self.body_limit
            && exceeds_body_limit(&err)
        {
            GatewayError::BodyTooLarge { max }
        } else if err.is_timeout() {
            GatewayError::UpstreamTimeout(service.to_string())
        } else if err.is_connect() {
            GatewayError::UpstreamConnectionFailed(format!("{service}: {err}"))
        } else {
            GatewayError::ProxyError(format!("{service}: {err}"))
        }
    }
}

/// Copies request headers for the upstream, dropping `Host` and hop-by-hop
/// headers. Repeated headers keep every value.
fn forwarded_request_headers(source: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if !headers::is_skipped_request_header(name.as_str()) {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}

/// Converts the upstream response into a client response with a streamed body.
fn relay_response(upstream: reqwest::Response) -> Response<GatewayBody> {
    let status = upstream.status();

    let mut relayed_headers = HeaderMap::with_capacity(upstream.headers().len());
    for (name, value) in upstream.headers() {
        if !headers::is_hop_by_hop(name.as_str()) {
            relayed_headers.append(name.clone(), value.clone());
        }
    }

    let stream = upstream
        .bytes_stream()
        .map_ok(Frame::data)
        .map_err(io::Error::other);

    let mut response = Response::new(StreamBody::new(stream).boxed_unsync());
    *response.status_mut() = status;
    *response.headers_mut() = relayed_headers;
    response
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(headers::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Walks an error's source chain looking for a body-limit violation.
fn exceeds_body_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use hyper::StatusCode;
    use reqwest::Url;
    use std::time::{Duration, Instant};
    use tokio::net::TcpListener;

    fn route_to(target: &str) -> RouteMatch {
        RouteMatch {
            service: "event".to_string(),
            auth_required: true,
            target: Url::parse(target).unwrap(),
            rewritten_path: "/events/42".to_string(),
        }
    }

    fn forwarder(timeout: Duration, max_body_size: usize) -> ProxyForwarder {
        ProxyForwarder::new(&ProxyConfig {
            timeout,
            max_body_size,
        })
        .unwrap()
    }

    async fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    // ===========================================
    // Header handling tests
    // ===========================================

    #[test]
    fn test_forwarded_headers_keep_authorization() {
        let mut source = HeaderMap::new();
        source.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        source.insert("content-type", HeaderValue::from_static("application/json"));
        source.insert("host", HeaderValue::from_static("gateway.local"));
        source.insert("connection", HeaderValue::from_static("keep-alive"));
        source.insert("x-request-id", HeaderValue::from_static("r-1"));

        let forwarded = forwarded_request_headers(&source);

        assert_eq!(forwarded.get("authorization").unwrap(), "Bearer abc.def.ghi");
        assert_eq!(forwarded.get("content-type").unwrap(), "application/json");
        assert_eq!(forwarded.get("x-request-id").unwrap(), "r-1");
        assert!(forwarded.get("host").is_none());
        assert!(forwarded.get("connection").is_none());
    }

    #[test]
    fn test_forwarded_headers_keep_repeated_values() {
        let mut source = HeaderMap::new();
        source.append("accept", HeaderValue::from_static("application/json"));
        source.append("accept", HeaderValue::from_static("text/plain"));

        let forwarded = forwarded_request_headers(&source);
        let values: Vec<_> = forwarded.get_all("accept").iter().collect();
        assert_eq!(values, vec!["application/json", "text/plain"]);
    }

    #[test]
    fn test_content_length_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_length(&headers), None);

        headers.insert("content-length", HeaderValue::from_static("1024"));
        assert_eq!(content_length(&headers), Some(1024));

        headers.insert("content-length", HeaderValue::from_static("nope"));
        assert_eq!(content_length(&headers), None);
    }

    #[tokio::test]
    async fn test_exceeds_body_limit_detects_length_limit_error() {
        let err = Limited::new(Full::new(Bytes::from_static(b"too long")), 2)
            .collect()
            .await
            .unwrap_err();
        assert!(exceeds_body_limit(&*err));

        let other = io::Error::other("unrelated");
        assert!(!exceeds_body_limit(&other));
    }

    // ===========================================
    // Construction tests
    // ===========================================

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ProxyForwarder::new(&ProxyConfig {
            timeout: Duration::ZERO,
            max_body_size: 0,
        });
        assert!(matches!(result, Err(GatewayError::ConfigError(_))));
    }

    // ===========================================
    // Transport failure tests
    // ===========================================

    #[tokio::test]
    async fn test_unreachable_upstream_is_connection_failure() {
        let port = unused_port().await;
        let forwarder = forwarder(Duration::from_secs(5), 0);
        let req = Request::get("/api/events/42")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let started = Instant::now();
        let err = forwarder
            .forward(req, &route_to(&format!("http://127.0.0.1:{port}")), None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::UpstreamConnectionFailed(_)), "{err:?}");
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering
        let holder = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let forwarder = forwarder(Duration::from_millis(200), 0);
        let req = Request::get("/api/events/42")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let err = forwarder
            .forward(req, &route_to(&format!("http://{addr}")), None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::UpstreamTimeout(_)), "{err:?}");
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        holder.abort();
    }

    #[tokio::test]
    async fn test_declared_oversized_body_rejected_before_connecting() {
        // Nothing listens here: a 413 proves no connection was attempted
        let port = unused_port().await;
        let forwarder = forwarder(Duration::from_secs(5), 4);
        let req = Request::post("/api/events")
            .header("content-length", "10")
            .body(Full::new(Bytes::from_static(b"0123456789")))
            .unwrap();

        let err = forwarder
            .forward(req, &route_to(&format!("http://127.0.0.1:{port}")), None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::BodyTooLarge { max: 4 }), "{err:?}");
    }

    #[tokio::test]
    async fn test_unlimited_body_skips_declared_length_check() {
        let port = unused_port().await;
        let forwarder = forwarder(Duration::from_secs(5), 0);
        let req = Request::post("/api/events")
            .header("content-length", usize::MAX.to_string())
            .body(Full::new(Bytes::from_static(b"0123456789")))
            .unwrap();

        // Reaching the closed port proves the length was never compared
        let err = forwarder
            .forward(req, &route_to(&format!("http://127.0.0.1:{port}")), None)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::UpstreamConnectionFailed(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_full_body_helper() {
        let body = full_body("hello");
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(bytes, "hello");
    }
}
