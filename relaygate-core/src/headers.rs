//! HTTP header constants for RelayGate.
//!
//! Header names used by the pipeline, and the hop-by-hop set (RFC 7230 §6.1)
//! that is stripped in both directions when proxying.

/// Authorization header (carries the bearer token, forwarded unmodified).
pub const AUTHORIZATION: &str = "authorization";

/// Content-Type header.
pub const CONTENT_TYPE: &str = "content-type";

/// Host header (rewritten to the upstream's authority).
pub const HOST: &str = "host";

/// Content-Length header.
pub const CONTENT_LENGTH: &str = "content-length";

/// Content type of every body the gateway synthesizes.
pub const APPLICATION_JSON: &str = "application/json";

/// Connection header (hop-by-hop).
pub const CONNECTION: &str = "connection";

/// Keep-Alive header (hop-by-hop).
pub const KEEP_ALIVE: &str = "keep-alive";

/// Proxy-Authenticate header (hop-by-hop).
pub const PROXY_AUTHENTICATE: &str = "proxy-authenticate";

/// Proxy-Authorization header (hop-by-hop).
pub const PROXY_AUTHORIZATION: &str = "proxy-authorization";

/// TE header (hop-by-hop).
pub const TE: &str = "te";

/// Trailers header (hop-by-hop).
pub const TRAILERS: &str = "trailers";

/// Transfer-Encoding header (hop-by-hop).
pub const TRANSFER_ENCODING: &str = "transfer-encoding";

/// Upgrade header (hop-by-hop).
pub const UPGRADE: &str = "upgrade";

/// List of all hop-by-hop headers that should not be forwarded.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    CONNECTION,
    KEEP_ALIVE,
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILERS,
    TRANSFER_ENCODING,
    UPGRADE,
];

/// Check if a header is a hop-by-hop header that shouldn't be forwarded.
///
/// `header_name` must be lowercase, which is what `http::HeaderName::as_str`
/// always returns.
///
/// # Example
///
/// ```
/// use relaygate_core::headers::is_hop_by_hop;
///
/// assert!(is_hop_by_hop("connection"));
/// assert!(is_hop_by_hop("transfer-encoding"));
/// assert!(!is_hop_by_hop("authorization"));
/// ```
pub fn is_hop_by_hop(header_name: &str) -> bool {
    HOP_BY_HOP_HEADERS.contains(&header_name)
}

/// Returns true if a request header must not be copied to the upstream request.
///
/// `Host` is dropped so the HTTP client derives it from the upstream URL.
pub fn is_skipped_request_header(header_name: &str) -> bool {
    header_name == HOST || is_hop_by_hop(header_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hop_by_hop_headers() {
        for name in HOP_BY_HOP_HEADERS {
            assert!(is_hop_by_hop(name), "{name} should be hop-by-hop");
        }
    }

    #[test]
    fn test_not_hop_by_hop_headers() {
        assert!(!is_hop_by_hop(AUTHORIZATION));
        assert!(!is_hop_by_hop(CONTENT_TYPE));
        assert!(!is_hop_by_hop(CONTENT_LENGTH));
        assert!(!is_hop_by_hop(HOST));
        assert!(!is_hop_by_hop("set-cookie"));
        assert!(!is_hop_by_hop("x-request-id"));
    }

    #[test]
    fn test_skipped_request_headers() {
        assert!(is_skipped_request_header(HOST));
        assert!(is_skipped_request_header(CONNECTION));
        assert!(!is_skipped_request_header(AUTHORIZATION));
        assert!(!is_skipped_request_header(CONTENT_LENGTH));
    }

    #[test]
    fn test_header_constants_lowercase() {
        // hyper normalizes header names to lowercase; constants must match
        assert_eq!(AUTHORIZATION, AUTHORIZATION.to_lowercase());
        assert_eq!(CONTENT_TYPE, CONTENT_TYPE.to_lowercase());
        assert_eq!(HOST, HOST.to_lowercase());
        assert_eq!(CONTENT_LENGTH, CONTENT_LENGTH.to_lowercase());
    }
}
