//! Failure shapes surfaced by test case bodies
//!
//! A [`FailureReport`] is the classifier's input: whatever the generated
//! client gave back on error, flattened to status + body + message. The
//! harness never interprets the wire format itself; it only pattern-matches
//! on this shape.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum body length before HTML-page detection kicks in.
///
/// Tiny bodies that happen to start with "<html" are more likely truncated
/// API payloads than a reverse-proxy error page.
const HTML_PAGE_MIN_LEN: usize = 50;

/// Raw failure payload from one outbound call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// HTTP status code, when the failure carried one
    pub status: Option<u16>,
    /// Raw response body text, when one was captured
    pub body: Option<String>,
    /// Error message as reported by the client
    pub message: String,
}

impl FailureReport {
    /// Create a report from an error message alone
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    /// Attach an HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the raw response body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Check whether the captured body looks like an HTML document.
    ///
    /// A structured API error is JSON; an HTML body means the request never
    /// reached the API handler (typically a reverse-proxy error page for a
    /// path the server does not route).
    pub fn is_html_page(&self) -> bool {
        match &self.body {
            Some(body) => {
                body.len() > HTML_PAGE_MIN_LEN
                    && (body.starts_with("<!DOCTYPE html>") || body.starts_with("<html"))
            }
            None => false,
        }
    }

    /// Check whether the body contains the given phrase (case-sensitive)
    pub fn body_contains(&self, phrase: &str) -> bool {
        self.body.as_deref().is_some_and(|b| b.contains(phrase))
    }

    /// Check whether the error message contains the given phrase,
    /// case-insensitively
    pub fn message_contains(&self, phrase: &str) -> bool {
        self.message.to_lowercase().contains(&phrase.to_lowercase())
    }
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Errors a test case body can surface to the orchestrator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CaseError {
    /// The outbound call failed; the report is fed through the classifier
    #[error("{0}")]
    Api(FailureReport),

    /// The case's own precondition-building logic broke.
    ///
    /// Always a FAIL: a setup failure means the test is wrong, not the
    /// environment.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The call was abandoned after the configured timeout
    #[error("request timed out after {elapsed:?}")]
    Timeout {
        /// How long the call was allowed to run
        elapsed: Duration,
    },
}

impl CaseError {
    /// Shorthand for a setup failure
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup(message.into())
    }

    /// Shorthand for an API failure with just a message
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(FailureReport::new(message))
    }
}

impl From<FailureReport> for CaseError {
    fn from(report: FailureReport) -> Self {
        Self::Api(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_detection_requires_prefix_and_length() {
        let page = FailureReport::new("err").with_body(format!(
            "<!DOCTYPE html><html><body>{}</body></html>",
            "x".repeat(60)
        ));
        assert!(page.is_html_page());

        let json = FailureReport::new("err")
            .with_body(r#"{"code":-1121,"msg":"not found, this body is long enough to matter"}"#);
        assert!(!json.is_html_page());

        let tiny = FailureReport::new("err").with_body("<html></html>");
        assert!(!tiny.is_html_page());
    }

    #[test]
    fn test_message_contains_is_case_insensitive() {
        let report = FailureReport::new("This Service Is Not Available");
        assert!(report.message_contains("this service is not available"));
        assert!(!report.message_contains("rate limit"));
    }

    #[test]
    fn test_display_includes_status() {
        let report = FailureReport::new("Forbidden").with_status(403);
        assert_eq!(report.to_string(), "HTTP 403: Forbidden");
        assert_eq!(FailureReport::new("boom").to_string(), "boom");
    }

    #[test]
    fn test_case_error_display() {
        let err = CaseError::setup("could not fetch current price");
        assert!(err.to_string().contains("setup failed"));

        let err = CaseError::Timeout {
            elapsed: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("timed out"));
    }
}
