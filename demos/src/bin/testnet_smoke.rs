//! Demo 2: Testnet Smoke Probe
//!
//! Showcases: live public endpoints on the Binance futures testnet, rate
//! gating across cases, and HTTP-to-failure-report conversion.
//!
//! Run: cargo run --bin testnet_smoke

use colored::*;
use testkit_auth::discover_from_env;
use testkit_harness::{http, HarnessConfig, SuiteRunner, TestCase};
use testkit_types::{AuthLevel, CaseError};

const BASE_URL: &str = "https://testnet.binancefuture.com";

async fn get_json(ctx: &testkit_harness::CaseContext, path: &str) -> Result<serde_json::Value, CaseError> {
    let client = http::client(ctx.config().rest_timeout)
        .map_err(|e| CaseError::setup(e.to_string()))?;
    let url = format!("{}{}", BASE_URL, path);
    ctx.call(async {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| CaseError::Api(http::failure_from_transport(&e)))?;
        let response = http::ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| CaseError::Api(http::failure_from_transport(&e)))
    })
    .await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("{}", "═".repeat(70).cyan());
    println!("{}", "  TESTNET SMOKE PROBE".cyan().bold());
    println!("{}", "  Futures Testkit Demo - Live Public Endpoints".cyan());
    println!("{}", "═".repeat(70).cyan());
    println!();
    println!("  {} Probing {}\n", "✓".green(), BASE_URL);

    let mut suite = SuiteRunner::new(HarnessConfig::from_env(), discover_from_env());

    suite.register(TestCase::new("Ping", AuthLevel::None, |ctx| async move {
        get_json(&ctx, "/fapi/v1/ping").await?;
        Ok(())
    }));

    suite.register(TestCase::new("Server Time", AuthLevel::None, |ctx| async move {
        let body = get_json(&ctx, "/fapi/v1/time").await?;
        if body.get("serverTime").and_then(|v| v.as_i64()).is_none() {
            return Err(CaseError::api("response missing serverTime"));
        }
        Ok(())
    }));

    suite.register(TestCase::new("Exchange Info", AuthLevel::None, |ctx| async move {
        let body = get_json(&ctx, "/fapi/v1/exchangeInfo").await?;
        let symbols = body
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| CaseError::api("response missing symbols"))?;
        let target = ctx.symbol().to_string();
        if !symbols
            .iter()
            .any(|s| s.get("symbol").and_then(|v| v.as_str()) == Some(target.as_str()))
        {
            return Err(CaseError::api(format!("symbol {} not listed", target)));
        }
        Ok(())
    }));

    suite.register(TestCase::new("Mark Price", AuthLevel::None, |ctx| async move {
        let path = format!("/fapi/v1/premiumIndex?symbol={}", ctx.symbol());
        let body = get_json(&ctx, &path).await?;
        if body.get("markPrice").is_none() {
            return Err(CaseError::api("response missing markPrice"));
        }
        Ok(())
    }));

    let summary = suite.run_all().await;
    suite.print_summary();

    if summary.all_passed() {
        println!("  {} All probes passed", "✓".green());
    } else {
        println!("  {} {} probe(s) failed", "✗".red(), summary.failed);
        std::process::exit(1);
    }
}
