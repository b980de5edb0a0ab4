//! Network request interception.
//!
//! A scenario installs rules keyed on (HTTP method, URL pattern) that can
//! force a request to fail at the network level instead of dispatching it.
//! Installing rules yields an [`InterceptHandle`] the scenario awaits to
//! know the intercepted call has actually been attempted. Rules are scoped
//! to one scenario's driver and torn down with it.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::result::{VitrinaError, VitrinaResult};

/// HTTP methods for request matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// PATCH request
    Patch,
    /// Any method
    Any,
}

impl HttpMethod {
    /// Parse from a wire string (unknown methods match as `Any`)
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            _ => Self::Any,
        }
    }

    /// Wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Any => "*",
        }
    }

    /// Check whether this method matches another
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        *self == Self::Any || *other == Self::Any || *self == *other
    }
}

/// Pattern for matching request URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring (also matches path fragments like "/api/cart")
    Contains(String),
    /// Regex match
    Regex(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern),
            Self::Contains(pattern) => url.contains(pattern),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
            Self::Any => true,
        }
    }

    /// CDP wildcard form of this pattern, for `Fetch.enable` request patterns.
    #[must_use]
    pub fn to_cdp_pattern(&self) -> String {
        match self {
            Self::Exact(pattern) => pattern.clone(),
            Self::Prefix(pattern) => format!("{pattern}*"),
            Self::Contains(pattern) => format!("*{pattern}*"),
            // Regex cannot be pushed down; intercept everything and filter locally
            Self::Regex(_) | Self::Any => "*".to_string(),
        }
    }
}

/// Network-level failure forced onto an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Generic network failure
    Failed,
    /// Request timed out
    TimedOut,
    /// Connection refused by the peer
    ConnectionRefused,
    /// No network at all
    InternetDisconnected,
}

impl FailureKind {
    /// Chromium error string surfaced for this failure
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Failed => "net::ERR_FAILED",
            Self::TimedOut => "net::ERR_TIMED_OUT",
            Self::ConnectionRefused => "net::ERR_CONNECTION_REFUSED",
            Self::InternetDisconnected => "net::ERR_INTERNET_DISCONNECTED",
        }
    }
}

/// What to do with a request matched by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterceptAction {
    /// Force the request to fail at the network level
    Fail(FailureKind),
    /// Let the request through untouched
    Continue,
}

/// A single interception rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterceptRule {
    /// HTTP method to match
    pub method: HttpMethod,
    /// URL pattern to match
    pub pattern: UrlPattern,
    /// Action to take on match
    pub action: InterceptAction,
}

impl InterceptRule {
    /// Rule forcing a network failure for matching requests
    #[must_use]
    pub fn fail(method: HttpMethod, pattern: UrlPattern, kind: FailureKind) -> Self {
        Self {
            method,
            pattern,
            action: InterceptAction::Fail(kind),
        }
    }

    /// Check whether this rule matches a request
    #[must_use]
    pub fn matches(&self, url: &str, method: &HttpMethod) -> bool {
        self.method.matches(method) && self.pattern.matches(url)
    }
}

/// Awaitable handle over an installed rule set.
///
/// Resolves once a matching request has been attempted, regardless of
/// whether the rule failed it or let it through.
#[derive(Debug, Clone, Default)]
pub struct InterceptHandle {
    attempts: Arc<AtomicUsize>,
    notify: Arc<tokio::sync::Notify>,
}

impl InterceptHandle {
    /// Create a fresh handle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of matched attempts observed so far
    #[must_use]
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Record a matched attempt and wake any waiter
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Wait until at least one matching request has been attempted.
    pub async fn wait_for_attempt(&self, timeout: Duration) -> VitrinaResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.attempt_count() > 0 {
                return Ok(());
            }
            let notified = self.notify.notified();
            if self.attempt_count() > 0 {
                return Ok(());
            }
            match tokio::time::timeout_at(deadline, notified).await {
                Ok(()) => {}
                Err(_) => {
                    if self.attempt_count() > 0 {
                        return Ok(());
                    }
                    return Err(VitrinaError::Timeout {
                        ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
            }
        }
    }
}

/// Rule-evaluation engine shared by both drivers.
///
/// The CDP driver consults it from the Fetch event loop; the mock driver
/// consults it when the widget model "sends" its cart request.
#[derive(Debug, Clone, Default)]
pub struct Interceptor {
    rules: Vec<InterceptRule>,
    handle: InterceptHandle,
}

impl Interceptor {
    /// Create an engine over a rule set
    #[must_use]
    pub fn new(rules: Vec<InterceptRule>) -> Self {
        Self {
            rules,
            handle: InterceptHandle::new(),
        }
    }

    /// The awaitable handle for this rule set
    #[must_use]
    pub fn handle(&self) -> InterceptHandle {
        self.handle.clone()
    }

    /// Whether any rules are installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide the action for a request. First matching rule wins; a matched
    /// request is recorded on the handle either way.
    pub fn decide(&self, url: &str, method: &HttpMethod) -> InterceptAction {
        for rule in &self.rules {
            if rule.matches(url, method) {
                tracing::debug!(target: "vitrina::network", url, method = method.as_str(), action = ?rule.action, "request intercepted");
                self.handle.record_attempt();
                return rule.action;
            }
        }
        InterceptAction::Continue
    }
}
