//! Orchestration harness for integration tests against the Binance
//! futures testnet
//!
//! The harness exists because testnet runs fail for three very different
//! reasons that must not be confused: the code under test is wrong, the
//! testnet does not support the operation, or the generated client hits a
//! URL that does not exist. This crate keeps those apart.
//!
//! # Features
//!
//! - **Rate gating**: one shared [`RateGate`] spaces every outbound call
//!   so the whole suite stays under the testnet's abuse thresholds
//! - **Classification**: an [`OutcomeClassifier`] turns raw failures into
//!   PASS / FAIL / SKIP verdicts via a prioritized rule table
//! - **Orchestration**: a [`SuiteRunner`] pairs cases with credential
//!   configurations, isolates panics, and collects one record per pairing
//! - **Reporting**: a [`SuiteSummary`] with the counters, the failure
//!   list, and the suspected-SDK-defect report
//!
//! # Example
//!
//! ```no_run
//! use testkit_harness::{SuiteRunner, TestCase};
//! use testkit_types::AuthLevel;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut suite = SuiteRunner::from_env();
//!     suite.register(TestCase::new("Exchange Info", AuthLevel::None, |ctx| async move {
//!         ctx.call(async {
//!             // call the generated client here
//!             Ok(())
//!         })
//!         .await
//!     }));
//!     let summary = suite.run_all().await;
//!     suite.print_summary();
//!     assert!(summary.all_passed());
//! }
//! ```
//!
//! Credential discovery and key handling live in `testkit-auth`; the
//! verdict and failure vocabulary lives in `testkit-types`.

pub mod classify;
pub mod config;
pub mod defects;
pub mod http;
pub mod rate_gate;
pub mod report;
pub mod suite;

// Re-export the main surface
pub use classify::{
    ClassifyRule, Classification, Matcher, OutcomeClassifier, RuleOutcome, SharedClassifier,
    STANDARD_RULES,
};
pub use config::{DestructiveToggles, HarnessConfig};
pub use defects::{shared_defect_log, DefectLog, SharedDefectLog};
pub use rate_gate::{shared_rate_gate, RateGate, SharedRateGate};
pub use report::SuiteSummary;
pub use suite::{CaseContext, CaseFn, CaseFuture, SuiteRunner, TestCase};
