//! Process-wide spacing between outbound calls
//!
//! Testnet servers trip abuse protections well below the documented
//! production limits, so the whole suite funnels every outbound call
//! through one shared [`RateGate`]. The gate is a leaky-bucket-of-one:
//! it guarantees a minimum interval between successive admissions no
//! matter how many tasks are waiting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Minimum-spacing gate shared across all concurrent test tasks.
///
/// `admit()` cannot fail; it only delays. The read-sleep-write sequence is
/// one critical section under an async mutex, so two callers can never
/// compute stale sleep durations against the same admission timestamp.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_admitted: Mutex<Option<Instant>>,
    admitted: AtomicU64,
}

impl RateGate {
    /// Create a gate admitting at most `requests_per_second` calls/second.
    ///
    /// A non-positive or non-finite rate disables throttling entirely.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            warn!(
                rate = requests_per_second,
                "invalid target rate, rate gate disabled"
            );
            Duration::ZERO
        };
        Self::with_interval(min_interval)
    }

    /// Create a gate with an explicit minimum interval between admissions
    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_admitted: Mutex::new(None),
            admitted: AtomicU64::new(0),
        }
    }

    /// Minimum spacing this gate enforces
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until at least `min_interval` has elapsed since the previous
    /// admission, then stamp the admission time.
    pub async fn admit(&self) {
        // The lock is held across the sleep on purpose: admission order is
        // first-come-first-served and the stamped timestamp must be the
        // one the next caller measures against.
        let mut last = self.last_admitted.lock().await;
        let now = Instant::now();
        if let Some(prev) = *last {
            let since = now.duration_since(prev);
            if since < self.min_interval {
                let wait = self.min_interval - since;
                debug!(?wait, "rate gate delaying call");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of calls admitted so far
    pub fn admitted_count(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }
}

/// Shared rate gate that can be cloned across tasks
pub type SharedRateGate = Arc<RateGate>;

/// Create a shared gate for the given target rate
pub fn shared_rate_gate(requests_per_second: f64) -> SharedRateGate {
    Arc::new(RateGate::new(requests_per_second))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_admission_is_immediate() {
        let gate = RateGate::new(2.0);
        let before = Instant::now();
        gate.admit().await;
        assert_eq!(Instant::now(), before);
        assert_eq!(gate.admitted_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_admissions_are_spaced() {
        let gate = RateGate::new(10.0); // 100ms interval
        gate.admit().await;
        let first = Instant::now();
        gate.admit().await;
        let second = Instant::now();
        assert!(second.duration_since(first) >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_admissions_never_violate_spacing() {
        let gate = shared_rate_gate(20.0); // 50ms interval
        let stamps = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let gate = Arc::clone(&gate);
            let stamps = Arc::clone(&stamps);
            handles.push(tokio::spawn(async move {
                gate.admit().await;
                stamps.lock().push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut stamps = stamps.lock().clone();
        stamps.sort();
        assert_eq!(stamps.len(), 8);
        for pair in stamps.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(50));
        }
        assert_eq!(gate.admitted_count(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_gate_does_not_delay() {
        let gate = RateGate::new(0.0);
        let before = Instant::now();
        for _ in 0..5 {
            gate.admit().await;
        }
        assert_eq!(Instant::now(), before);
        assert_eq!(gate.admitted_count(), 5);
    }
}
