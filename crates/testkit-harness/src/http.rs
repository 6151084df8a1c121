//! Bridging raw HTTP responses into classifiable failure reports
//!
//! Case bodies that talk to the testnet directly (setup calls, smoke
//! probes) use these helpers so their failures carry the status and body
//! the classifier needs.

use std::time::Duration;

use reqwest::Response;

use testkit_types::{CaseError, FailureReport};

/// Longest body excerpt carried in a failure message
const SNIPPET_MAX_LEN: usize = 200;

/// Build a failure report from a non-success HTTP response.
///
/// The full body is preserved on the report for pattern matching; the
/// message only carries an excerpt.
pub async fn failure_from_response(response: Response) -> FailureReport {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    FailureReport::new(format!("HTTP {}: {}", status, snippet(&body)))
        .with_status(status)
        .with_body(body)
}

/// Build a failure report from a transport-level error (connect failure,
/// TLS problem, client-side timeout)
pub fn failure_from_transport(error: &reqwest::Error) -> FailureReport {
    let mut report = FailureReport::new(error.to_string());
    if let Some(status) = error.status() {
        report = report.with_status(status.as_u16());
    }
    report
}

/// Pass a successful response through, convert anything else into a
/// classifiable error
pub async fn ensure_success(response: Response) -> Result<Response, CaseError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(CaseError::Api(failure_from_response(response).await))
    }
}

/// A shared client with the timeout the rest of the harness assumes
pub fn client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

fn snippet(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(SNIPPET_MAX_LEN) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}
