//! Harness configuration
//!
//! Everything here can be set programmatically or pulled from the
//! environment with [`HarnessConfig::from_env`]. Destructive operations
//! (order placement, cancel-all, leverage/margin changes) are opt-in via
//! explicit toggles so a default run never mutates account state.

use std::time::Duration;

use tracing::warn;

/// Target request rate override, requests/second
pub const ENV_REQUESTS_PER_SECOND: &str = "BINANCE_TEST_REQUESTS_PER_SECOND";
/// Target symbol override
pub const ENV_SYMBOL: &str = "BINANCE_TEST_SYMBOL";
/// Enable order-placement cases
pub const ENV_TRADING: &str = "BINANCE_TEST_TRADING";
/// Enable cancel-order / cancel-all cases
pub const ENV_CANCEL_ORDERS: &str = "BINANCE_TEST_CANCEL_ORDERS";
/// Enable batch-order cases
pub const ENV_BATCH_ORDERS: &str = "BINANCE_TEST_BATCH_ORDERS";
/// Enable leverage-change cases
pub const ENV_LEVERAGE_CHANGE: &str = "BINANCE_TEST_LEVERAGE_CHANGE";
/// Enable margin-type-change cases
pub const ENV_MARGIN_TYPE: &str = "BINANCE_TEST_MARGIN_TYPE";

/// Default outbound-call budget, requests/second
const DEFAULT_REQUESTS_PER_SECOND: f64 = 10.0;
/// Default REST call timeout
const DEFAULT_REST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default WebSocket request/response timeout
const DEFAULT_WS_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Default wait for a server-push stream event
const DEFAULT_STREAM_EVENT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default target symbol
const DEFAULT_SYMBOL: &str = "BTCUSDT";

/// Opt-in switches for cases that mutate account state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestructiveToggles {
    /// Order placement
    pub trading: bool,
    /// Cancel order / cancel all
    pub cancel_orders: bool,
    /// Batch order placement
    pub batch_orders: bool,
    /// Leverage changes
    pub leverage_change: bool,
    /// Margin type changes
    pub margin_type: bool,
}

impl DestructiveToggles {
    /// Everything enabled; only sensible against a throwaway account
    pub fn all_enabled() -> Self {
        Self {
            trading: true,
            cancel_orders: true,
            batch_orders: true,
            leverage_change: true,
            margin_type: true,
        }
    }
}

/// Run-wide configuration for the suite orchestrator and case bodies
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Outbound-call budget shared by the whole run, requests/second
    pub requests_per_second: f64,
    /// Timeout for one REST call
    pub rest_timeout: Duration,
    /// Timeout for one WebSocket request/response exchange
    pub ws_request_timeout: Duration,
    /// Timeout waiting for a server-push stream event
    pub stream_event_timeout: Duration,
    /// Target symbol for market-data and trading cases
    pub symbol: String,
    /// Destructive-operation switches
    pub toggles: DestructiveToggles,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            rest_timeout: DEFAULT_REST_TIMEOUT,
            ws_request_timeout: DEFAULT_WS_REQUEST_TIMEOUT,
            stream_event_timeout: DEFAULT_STREAM_EVENT_TIMEOUT,
            symbol: DEFAULT_SYMBOL.to_string(),
            toggles: DestructiveToggles::default(),
        }
    }
}

impl HarnessConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any environment variables that are set.
    ///
    /// Unparsable values are ignored with a warning rather than failing
    /// the whole run.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_REQUESTS_PER_SECOND) {
            match raw.parse::<f64>() {
                Ok(rate) if rate > 0.0 => config.requests_per_second = rate,
                _ => warn!(
                    value = %raw,
                    "ignoring unparsable {}", ENV_REQUESTS_PER_SECOND
                ),
            }
        }
        if let Ok(symbol) = std::env::var(ENV_SYMBOL) {
            if !symbol.is_empty() {
                config.symbol = symbol;
            }
        }
        config.toggles = DestructiveToggles {
            trading: env_flag(ENV_TRADING),
            cancel_orders: env_flag(ENV_CANCEL_ORDERS),
            batch_orders: env_flag(ENV_BATCH_ORDERS),
            leverage_change: env_flag(ENV_LEVERAGE_CHANGE),
            margin_type: env_flag(ENV_MARGIN_TYPE),
        };

        config
    }

    /// Set the target request rate
    pub fn with_requests_per_second(mut self, rate: f64) -> Self {
        self.requests_per_second = rate;
        self
    }

    /// Set the REST call timeout
    pub fn with_rest_timeout(mut self, timeout: Duration) -> Self {
        self.rest_timeout = timeout;
        self
    }

    /// Set the WebSocket request/response timeout
    pub fn with_ws_request_timeout(mut self, timeout: Duration) -> Self {
        self.ws_request_timeout = timeout;
        self
    }

    /// Set the stream-event wait timeout
    pub fn with_stream_event_timeout(mut self, timeout: Duration) -> Self {
        self.stream_event_timeout = timeout;
        self
    }

    /// Set the target symbol
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Set the destructive-operation toggles
    pub fn with_toggles(mut self, toggles: DestructiveToggles) -> Self {
        self.toggles = toggles;
        self
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "true").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment mutation is process-global; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for name in [
            ENV_REQUESTS_PER_SECOND,
            ENV_SYMBOL,
            ENV_TRADING,
            ENV_CANCEL_ORDERS,
            ENV_BATCH_ORDERS,
            ENV_LEVERAGE_CHANGE,
            ENV_MARGIN_TYPE,
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.requests_per_second, 10.0);
        assert_eq!(config.rest_timeout, Duration::from_secs(30));
        assert_eq!(config.symbol, "BTCUSDT");
        assert!(!config.toggles.trading);
    }

    #[test]
    fn test_builder_methods() {
        let config = HarnessConfig::new()
            .with_requests_per_second(5.0)
            .with_symbol("ETHUSDT")
            .with_toggles(DestructiveToggles::all_enabled());
        assert_eq!(config.requests_per_second, 5.0);
        assert_eq!(config.symbol, "ETHUSDT");
        assert!(config.toggles.cancel_orders);
    }

    #[test]
    fn test_from_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_REQUESTS_PER_SECOND, "2.5");
        std::env::set_var(ENV_SYMBOL, "BTCUSD_PERP");
        std::env::set_var(ENV_TRADING, "true");
        std::env::set_var(ENV_MARGIN_TYPE, "yes"); // only "true" enables

        let config = HarnessConfig::from_env();
        clear_env();

        assert_eq!(config.requests_per_second, 2.5);
        assert_eq!(config.symbol, "BTCUSD_PERP");
        assert!(config.toggles.trading);
        assert!(!config.toggles.margin_type);
    }

    #[test]
    fn test_from_env_ignores_bad_rate() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_REQUESTS_PER_SECOND, "fast");

        let config = HarnessConfig::from_env();
        clear_env();

        assert_eq!(config.requests_per_second, 10.0);
    }
}
