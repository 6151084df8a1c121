//! Failure classification
//!
//! Turns a raw failure into exactly one [`Verdict`] by walking a
//! prioritized rule table. The precedence is load-bearing:
//!
//! 1. HTTP 400 always fails. A 400 is a real contract violation even when
//!    its body happens to contain a "not found" phrase, so it must win
//!    before any skip rule can hide it.
//! 2. An HTML 404 page means the request never reached the API handler:
//!    the generated client is hitting a path the reverse proxy does not
//!    route. That is a suspected client defect, distinct from a
//!    structured 404 where the server legitimately lacks the resource.
//! 3. Plain 404/403 statuses and known testnet-limitation phrases are
//!    environment skips.
//! 4. Anything left is a genuine failure.
//!
//! The table is plain data so every precedence property can be unit
//! tested without a live connection.

use std::sync::Arc;

use tracing::debug;

use crate::defects::SharedDefectLog;
use testkit_types::{CaseError, FailureReport, Verdict};

/// Error phrases the testnet emits for operations it does not support.
///
/// Matched case-insensitively against the client's error message.
pub const TESTNET_LIMITATION_PATTERNS: &[&str] = &[
    "this service is not available",
    "feature not supported",
    "not available in testnet",
    "testnet not supported",
    "service temporarily unavailable",
    "function not supported",
    "undefined response type",
];

/// Error phrases suggesting the client requested a path that does not
/// exist. Matched case-insensitively, after the status-based rules.
pub const NOT_FOUND_PATTERNS: &[&str] = &[
    "404",
    "not found",
    "endpoint not found",
    "page not found",
    "resource not found",
    "url not found",
];

/// Predicate half of a classification rule
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// HTTP status is one of the given codes
    StatusIn(&'static [u16]),
    /// Body is an HTML document carrying a not-found phrase
    HtmlNotFoundPage,
    /// Body is an HTML document (any content)
    HtmlErrorPage,
    /// Error message contains any of the given phrases (case-insensitive)
    MessageContainsAny(&'static [&'static str]),
    /// Matches everything; terminal fallback rule
    Always,
}

impl Matcher {
    /// Check whether this matcher applies to the given report
    pub fn matches(&self, report: &FailureReport) -> bool {
        match self {
            Matcher::StatusIn(codes) => report
                .status
                .map(|status| codes.contains(&status))
                .unwrap_or(false),
            Matcher::HtmlNotFoundPage => {
                report.is_html_page()
                    && ((report.body_contains("404")
                        && report.body_contains("This page could not be found"))
                        || report.body_contains("Resource not found"))
            }
            Matcher::HtmlErrorPage => report.is_html_page(),
            Matcher::MessageContainsAny(phrases) => {
                phrases.iter().any(|phrase| report.message_contains(phrase))
            }
            Matcher::Always => true,
        }
    }
}

/// Outcome half of a classification rule
#[derive(Debug, Clone, Copy)]
pub enum RuleOutcome {
    /// Genuine, actionable failure
    Fail,
    /// Testnet does not support this operation
    SkipEnv,
    /// Suspected defect in the generated client; recorded in the defect log
    SkipDefect {
        /// Human-readable defect description
        note: &'static str,
    },
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRule {
    /// Short identifier, used in logs
    pub name: &'static str,
    /// Predicate
    pub matcher: Matcher,
    /// What to do when the predicate matches
    pub outcome: RuleOutcome,
}

/// The standard rule table, in precedence order (first match wins).
pub const STANDARD_RULES: &[ClassifyRule] = &[
    ClassifyRule {
        name: "bad-request",
        matcher: Matcher::StatusIn(&[400]),
        outcome: RuleOutcome::Fail,
    },
    ClassifyRule {
        name: "html-not-found-page",
        matcher: Matcher::HtmlNotFoundPage,
        outcome: RuleOutcome::SkipDefect {
            note: "incorrect URL in generated client (HTML 404 page)",
        },
    },
    ClassifyRule {
        name: "html-error-page",
        matcher: Matcher::HtmlErrorPage,
        outcome: RuleOutcome::SkipEnv,
    },
    ClassifyRule {
        name: "not-found-status",
        matcher: Matcher::StatusIn(&[404, 403]),
        outcome: RuleOutcome::SkipEnv,
    },
    ClassifyRule {
        name: "testnet-limitation",
        matcher: Matcher::MessageContainsAny(TESTNET_LIMITATION_PATTERNS),
        outcome: RuleOutcome::SkipEnv,
    },
    ClassifyRule {
        name: "not-found-message",
        matcher: Matcher::MessageContainsAny(NOT_FOUND_PATTERNS),
        outcome: RuleOutcome::SkipDefect {
            note: "error message suggests endpoint not found",
        },
    },
    ClassifyRule {
        name: "unclassified",
        matcher: Matcher::Always,
        outcome: RuleOutcome::Fail,
    },
];

/// Result of classifying one failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Terminal verdict for the pairing
    pub verdict: Verdict,
    /// Human-readable annotation for the outcome record
    pub detail: String,
}

/// Walks the rule table and records suspected defects.
///
/// The defect log is injected at construction so the same instance is
/// shared with the orchestrator that prints it; there is no global state.
pub struct OutcomeClassifier {
    rules: &'static [ClassifyRule],
    defects: SharedDefectLog,
}

impl OutcomeClassifier {
    /// Create a classifier with the standard rule table
    pub fn new(defects: SharedDefectLog) -> Self {
        Self::with_rules(STANDARD_RULES, defects)
    }

    /// Create a classifier with a custom rule table
    pub fn with_rules(rules: &'static [ClassifyRule], defects: SharedDefectLog) -> Self {
        Self { rules, defects }
    }

    /// The rule table this classifier evaluates
    pub fn rules(&self) -> &[ClassifyRule] {
        self.rules
    }

    /// Classify a raw failure report. First matching rule wins.
    pub fn classify(&self, test_name: &str, report: &FailureReport) -> Classification {
        for rule in self.rules {
            if !rule.matcher.matches(report) {
                continue;
            }
            debug!(case = test_name, rule = rule.name, "failure matched rule");
            return self.apply(test_name, rule, report);
        }
        // Reachable only with a custom table lacking a terminal rule
        Classification {
            verdict: Verdict::Fail,
            detail: report.to_string(),
        }
    }

    /// Classify a case error. Setup failures map straight to FAIL;
    /// timeouts go through the rule table so a limitation phrase can
    /// still reclassify them.
    pub fn classify_error(&self, test_name: &str, error: &CaseError) -> Classification {
        match error {
            CaseError::Api(report) => self.classify(test_name, report),
            CaseError::Setup(message) => Classification {
                verdict: Verdict::Fail,
                detail: format!("setup failed: {}", message),
            },
            CaseError::Timeout { elapsed } => self.classify(
                test_name,
                &FailureReport::new(format!("request timed out after {:.1}s", elapsed.as_secs_f64())),
            ),
        }
    }

    fn apply(&self, test_name: &str, rule: &ClassifyRule, report: &FailureReport) -> Classification {
        match rule.outcome {
            RuleOutcome::Fail => Classification {
                verdict: Verdict::Fail,
                detail: report.to_string(),
            },
            RuleOutcome::SkipEnv => {
                let detail = match report.status {
                    Some(status) => {
                        format!("endpoint not available on testnet (HTTP {})", status)
                    }
                    None => format!("testnet limitation: {}", report.message),
                };
                Classification {
                    verdict: Verdict::SkippedEnvLimitation,
                    detail,
                }
            }
            RuleOutcome::SkipDefect { note } => {
                self.defects.record(test_name, note);
                Classification {
                    verdict: Verdict::SkippedSdkDefect,
                    detail: note.to_string(),
                }
            }
        }
    }
}

/// Shared classifier handle
pub type SharedClassifier = Arc<OutcomeClassifier>;
