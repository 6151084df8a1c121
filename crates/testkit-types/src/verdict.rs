//! Terminal verdicts and per-pairing outcome records

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal classification assigned to one executed test pairing.
///
/// Every (test case, credential) pairing ends in exactly one verdict:
/// `Pending -> Running -> {Pass, Fail, SkippedEnvLimitation, SkippedSdkDefect}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The case body completed without error
    Pass,
    /// A genuine, actionable failure
    Fail,
    /// The testnet environment does not support this operation
    SkippedEnvLimitation,
    /// The failure pattern suggests a bug in the generated client
    SkippedSdkDefect,
}

impl Verdict {
    /// Check whether this verdict counts as a skip
    pub fn is_skip(self) -> bool {
        matches!(self, Verdict::SkippedEnvLimitation | Verdict::SkippedSdkDefect)
    }

    /// Check whether this verdict counts as a pass
    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
            Verdict::SkippedEnvLimitation => write!(f, "SKIP (testnet limitation)"),
            Verdict::SkippedSdkDefect => write!(f, "SKIP (suspected SDK defect)"),
        }
    }
}

/// Outcome of one executed (test case, credential) pairing.
///
/// Records are append-only: created once when the pairing finishes and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Name of the test case
    pub test_name: String,
    /// Name of the credential configuration the case ran under
    pub credential: String,
    /// Terminal verdict
    pub verdict: Verdict,
    /// Wall time the pairing took
    pub duration: Duration,
    /// Human-readable annotation (failure message, skip reason)
    pub detail: Option<String>,
}

impl OutcomeRecord {
    /// Create a record with no detail annotation
    pub fn new(
        test_name: impl Into<String>,
        credential: impl Into<String>,
        verdict: Verdict,
        duration: Duration,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            credential: credential.into(),
            verdict,
            duration,
            detail: None,
        }
    }

    /// Attach a detail annotation
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A suspected defect in the generated client, recorded by the classifier.
///
/// Duplicates are allowed: the same endpoint failing under two credential
/// configurations produces two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectRecord {
    /// Test case that surfaced the defect
    pub test_name: String,
    /// Human-readable description of the suspected defect
    pub note: String,
}

impl std::fmt::Display for DefectRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.test_name, self.note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_predicates() {
        assert!(Verdict::Pass.is_pass());
        assert!(!Verdict::Fail.is_pass());
        assert!(Verdict::SkippedEnvLimitation.is_skip());
        assert!(Verdict::SkippedSdkDefect.is_skip());
        assert!(!Verdict::Fail.is_skip());
    }

    #[test]
    fn test_record_serializes() {
        let record = OutcomeRecord::new(
            "Exchange Info",
            "Public Endpoints",
            Verdict::Pass,
            Duration::from_millis(420),
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("Exchange Info"));
        assert!(json.contains("Pass"));
    }

    #[test]
    fn test_defect_display() {
        let defect = DefectRecord {
            test_name: "Funding Info".to_string(),
            note: "incorrect URL in generated client".to_string(),
        };
        assert_eq!(
            defect.to_string(),
            "Funding Info: incorrect URL in generated client"
        );
    }
}
