//! End-of-run summary report
//!
//! Aggregates the per-pairing records into the counters and lists the
//! orchestrator prints after a run. Building the summary is a pure read
//! over the records, so it can be rebuilt any number of times.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use testkit_types::{DefectRecord, OutcomeRecord, Verdict};

/// Aggregated result of one suite run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteSummary {
    /// When the run started, if it ran at all
    pub started_at: Option<DateTime<Utc>>,
    /// Wall time spent inside `run_all`, accumulated across runs
    pub elapsed: Duration,
    /// Number of attempted pairings
    pub total: usize,
    /// Pairings that passed
    pub passed: usize,
    /// Pairings that failed
    pub failed: usize,
    /// Pairings skipped because of a testnet limitation
    pub skipped_env: usize,
    /// Pairings skipped because of a suspected client defect
    pub skipped_defect: usize,
    /// Outbound calls admitted through the rate gate
    pub requests: u64,
    /// The failing records, for the detail listing
    pub failures: Vec<OutcomeRecord>,
    /// Suspected client defects recorded during the run
    pub defects: Vec<DefectRecord>,
}

impl SuiteSummary {
    /// Aggregate the given records into a summary
    pub fn build(
        records: &[OutcomeRecord],
        defects: Vec<DefectRecord>,
        elapsed: Duration,
        requests: u64,
        started_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut summary = Self {
            started_at,
            elapsed,
            total: records.len(),
            passed: 0,
            failed: 0,
            skipped_env: 0,
            skipped_defect: 0,
            requests,
            failures: Vec::new(),
            defects,
        };
        for record in records {
            match record.verdict {
                Verdict::Pass => summary.passed += 1,
                Verdict::Fail => {
                    summary.failed += 1;
                    summary.failures.push(record.clone());
                }
                Verdict::SkippedEnvLimitation => summary.skipped_env += 1,
                Verdict::SkippedSdkDefect => summary.skipped_defect += 1,
            }
        }
        summary
    }

    /// Total number of skipped pairings
    pub fn skipped(&self) -> usize {
        self.skipped_env + self.skipped_defect
    }

    /// Check whether every attempted pairing passed or was skipped
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Serialize the summary as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for SuiteSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Test Suite Summary ===")?;
        writeln!(f, "Total Duration: {:.2}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "Total Tests: {}", self.total)?;
        writeln!(f, "Passed: {}", self.passed)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(
            f,
            "Skipped: {} ({} testnet limitation, {} suspected SDK defect)",
            self.skipped(),
            self.skipped_env,
            self.skipped_defect
        )?;
        writeln!(f, "Total API Requests: {}", self.requests)?;

        if !self.failures.is_empty() {
            writeln!(f, "\nFailed Tests:")?;
            for record in &self.failures {
                write!(f, "  - {} [{}]", record.test_name, record.credential)?;
                if let Some(detail) = &record.detail {
                    write!(f, " (Error: {})", detail)?;
                }
                writeln!(f)?;
            }
        }

        if !self.defects.is_empty() {
            writeln!(f, "\nSuspected SDK Issues:")?;
            for defect in &self.defects {
                writeln!(f, "  - {}", defect)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, verdict: Verdict) -> OutcomeRecord {
        OutcomeRecord::new(name, "HMAC Authentication", verdict, Duration::from_millis(5))
    }

    #[test]
    fn test_counters_partition_the_records() {
        let records = vec![
            record("a", Verdict::Pass),
            record("b", Verdict::Fail),
            record("c", Verdict::SkippedEnvLimitation),
            record("d", Verdict::SkippedSdkDefect),
            record("e", Verdict::Pass),
        ];
        let summary =
            SuiteSummary::build(&records, Vec::new(), Duration::from_secs(2), 9, None);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped_env, 1);
        assert_eq!(summary.skipped_defect, 1);
        assert_eq!(summary.passed + summary.failed + summary.skipped(), 5);
        assert!(!summary.all_passed());
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].test_name, "b");
    }

    #[test]
    fn test_display_lists_failures_with_detail() {
        let records = vec![
            record("Exchange Info", Verdict::Pass),
            record("Create Order", Verdict::Fail)
                .with_detail("HTTP 500: internal error"),
        ];
        let summary = SuiteSummary::build(
            &records,
            Vec::new(),
            Duration::from_millis(1500),
            4,
            Some(Utc::now()),
        );

        let text = summary.to_string();
        assert!(text.contains("=== Test Suite Summary ==="));
        assert!(text.contains("Total Duration: 1.50s"));
        assert!(text.contains("Total Tests: 2"));
        assert!(text.contains("Total API Requests: 4"));
        assert!(text.contains("- Create Order [HMAC Authentication] (Error: HTTP 500: internal error)"));
    }

    #[test]
    fn test_display_includes_defect_report() {
        let defects = vec![DefectRecord {
            test_name: "Funding Info".to_string(),
            note: "incorrect URL in generated client (HTML 404 page)".to_string(),
        }];
        let summary =
            SuiteSummary::build(&[], defects, Duration::ZERO, 0, None);

        let text = summary.to_string();
        assert!(text.contains("Suspected SDK Issues:"));
        assert!(text.contains("Funding Info: incorrect URL in generated client"));
    }

    #[test]
    fn test_empty_summary_passes_trivially() {
        let summary = SuiteSummary::build(&[], Vec::new(), Duration::ZERO, 0, None);
        assert!(summary.all_passed());
        assert_eq!(summary.total, 0);
        let text = summary.to_string();
        assert!(!text.contains("Failed Tests:"));
        assert!(!text.contains("Suspected SDK Issues:"));
    }

    #[test]
    fn test_json_serialization() {
        let summary = SuiteSummary::build(
            &[record("a", Verdict::Pass)],
            Vec::new(),
            Duration::from_secs(1),
            1,
            None,
        );
        let json = summary.to_json().unwrap();
        assert!(json.contains("\"total\": 1"));
        assert!(json.contains("\"passed\": 1"));
    }
}
