//! Suite orchestration
//!
//! The [`SuiteRunner`] pairs every registered [`TestCase`] with every
//! credential configuration whose authorization level is sufficient, runs
//! each pairing as an isolated task, classifies failures, and collects one
//! [`OutcomeRecord`] per pairing.
//!
//! Isolation is the one correctness-critical behavior here: a panicking
//! case body is caught at the task join boundary and converted to a FAIL
//! record; sibling pairings keep running.
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
//!     suite.register(TestCase::new("Server Time", AuthLevel::None, |ctx| async move {
//!         ctx.call(async {
//!             // drive the generated client here
//!             Ok(())
//!         })
//!         .await
//!     }));
//!     suite.run_all().await;
//!     suite.print_summary();
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::classify::{OutcomeClassifier, SharedClassifier};
use crate::config::HarnessConfig;
use crate::defects::{shared_defect_log, SharedDefectLog};
use crate::rate_gate::{shared_rate_gate, SharedRateGate};
use crate::report::SuiteSummary;
use testkit_auth::{discover_from_env, CredentialConfig};
use testkit_types::{AuthLevel, CaseError, DefectRecord, FailureReport, OutcomeRecord, Verdict};

/// Boxed future returned by a test case body
pub type CaseFuture = Pin<Box<dyn Future<Output = Result<(), CaseError>> + Send>>;

/// Shared, reusable test case body
pub type CaseFn = Arc<dyn Fn(CaseContext) -> CaseFuture + Send + Sync>;

/// One named test case with its required authorization level.
///
/// Cases are registered before the run and immutable afterwards.
pub struct TestCase {
    name: String,
    required_auth: AuthLevel,
    run: CaseFn,
}

impl TestCase {
    /// Create a test case from an async closure
    pub fn new<F, Fut>(name: impl Into<String>, required_auth: AuthLevel, body: F) -> Self
    where
        F: Fn(CaseContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CaseError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            required_auth,
            run: Arc::new(move |ctx| Box::pin(body(ctx))),
        }
    }

    /// Case name, used in records and the summary
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Authorization level a credential must reach to run this case
    pub fn required_auth(&self) -> AuthLevel {
        self.required_auth
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("required_auth", &self.required_auth)
            .finish()
    }
}

/// Per-pairing context handed to a case body.
///
/// Each pairing gets its own credential clone so no signing context is
/// shared across concurrently running cases; the rate gate and config are
/// the shared pieces.
#[derive(Clone)]
pub struct CaseContext {
    credential: Arc<CredentialConfig>,
    config: Arc<HarnessConfig>,
    gate: SharedRateGate,
}

impl CaseContext {
    /// Credential configuration this pairing runs under
    pub fn credential(&self) -> &CredentialConfig {
        &self.credential
    }

    /// Run-wide configuration
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Target symbol for this run
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Gate an outbound REST call and bound it by the REST timeout
    pub async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, CaseError>>,
    ) -> Result<T, CaseError> {
        self.timed_call(self.config.rest_timeout, fut).await
    }

    /// Gate an outbound WebSocket request/response exchange
    pub async fn ws_call<T>(
        &self,
        fut: impl Future<Output = Result<T, CaseError>>,
    ) -> Result<T, CaseError> {
        self.timed_call(self.config.ws_request_timeout, fut).await
    }

    /// Gate an outbound call with an explicit timeout.
    ///
    /// Admission through the shared gate happens before the timeout window
    /// starts, so a long queue wait is never billed to the remote call.
    pub async fn timed_call<T>(
        &self,
        limit: Duration,
        fut: impl Future<Output = Result<T, CaseError>>,
    ) -> Result<T, CaseError> {
        self.gate.admit().await;
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(CaseError::Timeout { elapsed: limit }),
        }
    }

    /// Wait for a server-push stream event.
    ///
    /// Not gated: waiting on a push event is not an outbound call.
    pub async fn wait_for_stream<T>(
        &self,
        fut: impl Future<Output = Result<T, CaseError>>,
    ) -> Result<T, CaseError> {
        let limit = self.config.stream_event_timeout;
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(CaseError::Timeout { elapsed: limit }),
        }
    }

    /// Bail out of a case whose destructive operation is switched off.
    ///
    /// The message deliberately carries a testnet-limitation phrase so the
    /// classifier skips the pairing instead of failing it.
    pub fn require_toggle(&self, enabled: bool, operation: &str) -> Result<(), CaseError> {
        if enabled {
            Ok(())
        } else {
            Err(CaseError::Api(FailureReport::new(format!(
                "{} not available in testnet run (disabled by configuration)",
                operation
            ))))
        }
    }
}

/// One pairing awaiting completion, with enough metadata to synthesize a
/// record if its task is lost.
enum PairingSlot {
    Ready(OutcomeRecord),
    Running {
        test_name: String,
        credential: String,
        handle: JoinHandle<OutcomeRecord>,
    },
}

/// Runs the registered cases against the configured credentials.
///
/// All shared state (rate gate, defect log, outcome list) is owned here
/// and injected into collaborators explicitly; nothing is process-global.
pub struct SuiteRunner {
    cases: Vec<TestCase>,
    credentials: Vec<Arc<CredentialConfig>>,
    config: Arc<HarnessConfig>,
    gate: SharedRateGate,
    defects: SharedDefectLog,
    classifier: SharedClassifier,
    records: Mutex<Vec<OutcomeRecord>>,
    elapsed: Mutex<Duration>,
    started_at: Mutex<Option<DateTime<Utc>>>,
}

impl SuiteRunner {
    /// Create a runner with explicit configuration and credentials
    pub fn new(config: HarnessConfig, credentials: Vec<CredentialConfig>) -> Self {
        let gate = shared_rate_gate(config.requests_per_second);
        let defects = shared_defect_log();
        let classifier = Arc::new(OutcomeClassifier::new(Arc::clone(&defects)));
        Self {
            cases: Vec::new(),
            credentials: credentials.into_iter().map(Arc::new).collect(),
            config: Arc::new(config),
            gate,
            defects,
            classifier,
            records: Mutex::new(Vec::new()),
            elapsed: Mutex::new(Duration::ZERO),
            started_at: Mutex::new(None),
        }
    }

    /// Create a runner from the process environment: config overrides plus
    /// credential discovery
    pub fn from_env() -> Self {
        Self::new(HarnessConfig::from_env(), discover_from_env())
    }

    /// Register one test case
    pub fn register(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// Register several test cases
    pub fn register_all(&mut self, cases: impl IntoIterator<Item = TestCase>) {
        self.cases.extend(cases);
    }

    /// Number of registered cases
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Number of configured credentials
    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// The shared rate gate (e.g. for ad-hoc setup calls outside a case)
    pub fn gate(&self) -> SharedRateGate {
        Arc::clone(&self.gate)
    }

    /// The shared defect log
    pub fn defect_log(&self) -> SharedDefectLog {
        Arc::clone(&self.defects)
    }

    /// Run every runnable pairing to completion and return the summary.
    ///
    /// Pairings run as independent concurrent tasks; the shared rate gate
    /// serializes their outbound calls. Records land in registration
    /// order regardless of completion order.
    pub async fn run_all(&self) -> SuiteSummary {
        let run_started = Instant::now();
        {
            let mut started_at = self.started_at.lock();
            if started_at.is_none() {
                *started_at = Some(Utc::now());
            }
        }
        info!(
            cases = self.cases.len(),
            credentials = self.credentials.len(),
            "running suite"
        );

        let mut slots = Vec::new();
        for case in &self.cases {
            let sufficient: Vec<_> = self
                .credentials
                .iter()
                .filter(|cred| cred.satisfies(case.required_auth()))
                .cloned()
                .collect();

            if sufficient.is_empty() {
                warn!(
                    case = case.name(),
                    required = %case.required_auth(),
                    "no credential configuration reaches the required level"
                );
                slots.push(PairingSlot::Ready(
                    OutcomeRecord::new(
                        case.name(),
                        "none",
                        Verdict::SkippedEnvLimitation,
                        Duration::ZERO,
                    )
                    .with_detail("no authentication configured"),
                ));
                continue;
            }

            for credential in sufficient {
                slots.push(self.spawn_pairing(case, credential));
            }
        }

        for slot in slots {
            let record = match slot {
                PairingSlot::Ready(record) => record,
                PairingSlot::Running {
                    test_name,
                    credential,
                    handle,
                } => handle.await.unwrap_or_else(|_| {
                    OutcomeRecord::new(test_name, credential, Verdict::Fail, Duration::ZERO)
                        .with_detail("pairing task failed to report")
                }),
            };
            self.records.lock().push(record);
        }

        *self.elapsed.lock() += run_started.elapsed();
        let summary = self.summary();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped(),
            "suite finished"
        );
        summary
    }

    fn spawn_pairing(&self, case: &TestCase, credential: Arc<CredentialConfig>) -> PairingSlot {
        let test_name = case.name().to_string();
        let credential_name = credential.name().to_string();
        let ctx = CaseContext {
            credential,
            config: Arc::clone(&self.config),
            gate: Arc::clone(&self.gate),
        };
        let run = Arc::clone(&case.run);
        let classifier = Arc::clone(&self.classifier);

        let task_name = test_name.clone();
        let task_credential = credential_name.clone();
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            debug!(case = %task_name, credential = %task_credential, "pairing started");

            // The body runs in its own task so a panic is caught at the
            // join boundary instead of tearing down this pairing task.
            let body = tokio::spawn(run(ctx));
            let (verdict, detail) = match body.await {
                Ok(Ok(())) => (Verdict::Pass, None),
                Ok(Err(error)) => {
                    let classified = classifier.classify_error(&task_name, &error);
                    (classified.verdict, Some(classified.detail))
                }
                Err(join_error) if join_error.is_panic() => (
                    Verdict::Fail,
                    Some("case body panicked".to_string()),
                ),
                Err(_) => (Verdict::Fail, Some("case body cancelled".to_string())),
            };

            let duration = started.elapsed();
            info!(
                case = %task_name,
                credential = %task_credential,
                verdict = %verdict,
                ?duration,
                "pairing finished"
            );
            let mut record =
                OutcomeRecord::new(task_name, task_credential, verdict, duration);
            if let Some(detail) = detail {
                record = record.with_detail(detail);
            }
            record
        });

        PairingSlot::Running {
            test_name,
            credential: credential_name,
            handle,
        }
    }

    /// Copy of every outcome record collected so far
    pub fn records(&self) -> Vec<OutcomeRecord> {
        self.records.lock().clone()
    }

    /// Copy of every suspected defect recorded so far
    pub fn defects(&self) -> Vec<DefectRecord> {
        self.defects.snapshot()
    }

    /// Build the summary from the current records. Pure read: calling this
    /// (or [`print_summary`](Self::print_summary)) repeatedly without an
    /// intervening run yields identical results.
    pub fn summary(&self) -> SuiteSummary {
        SuiteSummary::build(
            &self.records.lock(),
            self.defects.snapshot(),
            *self.elapsed.lock(),
            self.gate.admitted_count(),
            *self.started_at.lock(),
        )
    }

    /// Print the summary report to stdout
    pub fn print_summary(&self) {
        println!("{}", self.summary());
    }
}

impl std::fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("cases", &self.cases.len())
            .field("credentials", &self.credentials.len())
            .field("records", &self.records.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade_credential() -> CredentialConfig {
        CredentialConfig::hmac("api-key", "secret")
    }

    fn quick_config() -> HarnessConfig {
        // Effectively no throttling so tests run instantly
        HarnessConfig::new().with_requests_per_second(100_000.0)
    }

    #[tokio::test]
    async fn test_verdict_counts_match_attempted_pairings() {
        let mut suite = SuiteRunner::new(quick_config(), vec![trade_credential()]);
        suite.register(TestCase::new("ok", AuthLevel::None, |_ctx| async { Ok(()) }));
        suite.register(TestCase::new("boom", AuthLevel::None, |_ctx| async {
            Err(CaseError::api("connection reset"))
        }));

        let summary = suite.run_all().await;
        assert_eq!(summary.total, 2);
        assert_eq!(
            summary.passed + summary.failed + summary.skipped(),
            summary.total
        );
    }

    #[tokio::test]
    async fn test_unrunnable_case_is_skipped_without_execution() {
        let executed = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&executed);

        // Only a public credential; the case needs TRADE
        let mut suite = SuiteRunner::new(quick_config(), vec![CredentialConfig::public()]);
        suite.register(TestCase::new("Create Order", AuthLevel::Trade, move |_ctx| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }
        }));

        let summary = suite.run_all().await;
        let records = suite.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].verdict, Verdict::SkippedEnvLimitation);
        assert_eq!(
            records[0].detail.as_deref(),
            Some("no authentication configured")
        );
        assert!(!executed.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(summary.skipped_env, 1);
    }

    #[tokio::test]
    async fn test_panicking_case_does_not_abort_siblings() {
        let mut suite = SuiteRunner::new(quick_config(), vec![trade_credential()]);
        suite.register(TestCase::new("panics", AuthLevel::None, |_ctx| async {
            panic!("assertion blew up");
        }));
        suite.register(TestCase::new("survives", AuthLevel::None, |_ctx| async {
            Ok(())
        }));

        let summary = suite.run_all().await;
        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 1);

        let records = suite.records();
        assert_eq!(records[0].verdict, Verdict::Fail);
        assert_eq!(records[0].detail.as_deref(), Some("case body panicked"));
        assert_eq!(records[1].verdict, Verdict::Pass);
    }

    #[tokio::test]
    async fn test_records_follow_registration_order() {
        let mut suite = SuiteRunner::new(quick_config(), vec![trade_credential()]);
        for name in ["a", "b", "c"] {
            suite.register(TestCase::new(name, AuthLevel::None, |_ctx| async { Ok(()) }));
        }

        suite.run_all().await;
        let names: Vec<_> = suite.records().into_iter().map(|r| r.test_name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_toggle_guard_skips_as_env_limitation() {
        let mut suite = SuiteRunner::new(quick_config(), vec![trade_credential()]);
        suite.register(TestCase::new("Batch Orders", AuthLevel::Trade, |ctx| async move {
            ctx.require_toggle(ctx.config().toggles.batch_orders, "batch orders")?;
            Ok(())
        }));

        let summary = suite.run_all().await;
        assert_eq!(summary.skipped_env, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn test_timed_call_converts_elapsed_to_timeout_error() {
        let config = quick_config().with_rest_timeout(Duration::from_millis(10));
        let mut suite = SuiteRunner::new(config, vec![trade_credential()]);
        suite.register(TestCase::new("slow", AuthLevel::None, |ctx| async move {
            ctx.call(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await
        }));

        let summary = suite.run_all().await;
        assert_eq!(summary.failed, 1);
        let records = suite.records();
        assert!(records[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn test_summary_is_idempotent_between_runs() {
        let mut suite = SuiteRunner::new(quick_config(), vec![trade_credential()]);
        suite.register(TestCase::new("ok", AuthLevel::None, |_ctx| async { Ok(()) }));

        suite.run_all().await;
        let first = suite.summary();
        let second = suite.summary();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }
}
