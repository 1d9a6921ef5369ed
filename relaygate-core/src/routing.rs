//! Route table and request classification.
//!
//! The table is an ordered list of [`RouteRule`]s built once at startup.
//! Classification is a pure function of the request path: rules are tried in
//! declaration order and the first matching prefix wins.
//!
//! Prefixes match on segment boundaries, so `/api/events` matches
//! `/api/events` and `/api/events/42` but not `/api/eventsfeed`.

use reqwest::Url;

use crate::defaults;
use crate::error::{GatewayError, Result};
use crate::types::UpstreamTargets;

/// How the externally visible path maps onto the path the upstream expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathRewrite {
    /// Forward the path unchanged.
    Preserve,
    /// Replace the leading `from` segment(s) with `to`.
    ReplacePrefix {
        /// Leading portion of the external path to remove.
        from: String,
        /// Replacement inserted in its place (may be empty).
        to: String,
    },
}

impl PathRewrite {
    /// Builds a rewrite that removes `prefix` from the front of the path.
    pub fn strip(prefix: &str) -> Self {
        Self::replace(prefix, "")
    }

    /// Builds a rewrite that swaps `from` for `to` at the front of the path.
    pub fn replace(from: &str, to: &str) -> Self {
        Self::ReplacePrefix {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Applies the rewrite to a request path.
    ///
    /// Paths that do not start with `from` are returned unchanged. The result
    /// always starts with `/`.
    pub fn apply(&self, path: &str) -> String {
        match self {
            Self::Preserve => path.to_string(),
            Self::ReplacePrefix { from, to } => match path.strip_prefix(from.as_str()) {
                Some(rest) => {
                    let rewritten = format!("{to}{rest}");
                    if rewritten.starts_with('/') {
                        rewritten
                    } else {
                        format!("/{rewritten}")
                    }
                }
                None => path.to_string(),
            },
        }
    }
}

/// A single routing rule.
#[derive(Clone, Debug)]
pub struct RouteRule {
    /// Service label used in logs.
    pub name: String,
    /// External path prefix this rule claims.
    pub prefix: String,
    /// Whether a valid bearer token is required.
    pub auth_required: bool,
    /// Upstream base URL.
    pub target: Url,
    /// Path mapping applied before forwarding.
    pub rewrite: PathRewrite,
}

impl RouteRule {
    /// Creates a rule, validating the upstream URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if `target` is not an absolute
    /// `http`/`https` URL with a host, or if `prefix` does not start with `/`.
    pub fn new(
        name: &str,
        prefix: &str,
        auth_required: bool,
        target: &str,
        rewrite: PathRewrite,
    ) -> Result<Self> {
        if !prefix.starts_with('/') {
            return Err(GatewayError::ConfigError(format!(
                "route prefix for {name} must start with '/': '{prefix}'"
            )));
        }

        let target = parse_target(name, target)?;

        Ok(Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            auth_required,
            target,
            rewrite,
        })
    }

    /// Returns true if the rule claims `path`.
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}

fn parse_target(name: &str, target: &str) -> Result<Url> {
    let url = Url::parse(target).map_err(|e| {
        GatewayError::ConfigError(format!("invalid upstream URL for {name} '{target}': {e}"))
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(GatewayError::ConfigError(format!(
            "upstream URL for {name} must be http(s) with a host: '{target}'"
        )));
    }

    Ok(url)
}

/// A matched route, ready to be authenticated and forwarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    /// Service label of the matched rule.
    pub service: String,
    /// Whether a valid bearer token is required.
    pub auth_required: bool,
    /// Upstream base URL.
    pub target: Url,
    /// Request path after the rule's rewrite.
    pub rewritten_path: String,
}

impl RouteMatch {
    /// Builds the absolute upstream URL, re-attaching the original query string.
    ///
    /// # Example
    ///
    /// ```
    /// use relaygate_core::routing::{PathRewrite, RouteRule, RouteTable, RoutingDecision};
    ///
    /// let table = RouteTable::new(vec![
    ///     RouteRule::new("event", "/api/events", true, "http://events:3002", PathRewrite::strip("/api"))
    ///         .unwrap(),
    /// ]);
    ///
    /// let RoutingDecision::Matched(route) = table.classify("/api/events/42") else {
    ///     panic!("expected a match");
    /// };
    /// assert_eq!(route.upstream_url(Some("page=2")), "http://events:3002/events/42?page=2");
    /// ```
    pub fn upstream_url(&self, query: Option<&str>) -> String {
        let base = self.target.as_str().trim_end_matches('/');
        match query {
            Some(q) if !q.is_empty() => format!("{base}{}?{q}", self.rewritten_path),
            _ => format!("{base}{}", self.rewritten_path),
        }
    }
}

/// Outcome of classifying a request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutingDecision {
    /// A rule matched.
    Matched(RouteMatch),
    /// No rule matched; the request ends in a 404.
    NotFound,
}

impl RoutingDecision {
    /// Returns true if a rule matched.
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Returns true if the matched rule requires authentication.
    pub fn auth_required(&self) -> bool {
        matches!(self, Self::Matched(route) if route.auth_required)
    }
}

/// Immutable, ordered set of routing rules.
#[derive(Clone, Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Creates a table from rules, kept in the given order.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Builds the gateway's standard table.
    ///
    /// | prefix              | auth | rewrite                          |
    /// |---------------------|------|----------------------------------|
    /// | `/api/auth`         | no   | unchanged                        |
    /// | `/api/events`       | yes  | `/api/events/1` → `/events/1`    |
    /// | `/api/invitations`  | yes  | `/api/invitations/5` → `/api/5`  |
    ///
    /// The event route strips `/api` while the invitation route collapses its
    /// prefix into `/api`. The two upstreams lay out their paths differently
    /// and each mapping is kept exactly as the services expect.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigError`] if any upstream URL is invalid.
    pub fn standard(upstreams: &UpstreamTargets) -> Result<Self> {
        Ok(Self::new(vec![
            RouteRule::new(
                "identity",
                defaults::AUTH_PREFIX,
                false,
                &upstreams.identity,
                PathRewrite::Preserve,
            )?,
            RouteRule::new(
                "event",
                defaults::EVENT_PREFIX,
                true,
                &upstreams.event,
                PathRewrite::strip("/api"),
            )?,
            RouteRule::new(
                "invitation",
                defaults::INVITATION_PREFIX,
                true,
                &upstreams.invitation,
                PathRewrite::replace(defaults::INVITATION_PREFIX, "/api"),
            )?,
        ]))
    }

    /// Classifies a request path. First matching rule wins.
    pub fn classify(&self, path: &str) -> RoutingDecision {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map_or(RoutingDecision::NotFound, |rule| {
                RoutingDecision::Matched(RouteMatch {
                    service: rule.name.clone(),
                    auth_required: rule.auth_required,
                    target: rule.target.clone(),
                    rewritten_path: rule.rewrite.apply(path),
                })
            })
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
