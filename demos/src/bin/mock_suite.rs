//! Demo 1: Offline Mock Suite
//!
//! Showcases: case registration, authorization pairing, failure
//! classification, and the summary report, all without touching the
//! network.
//!
//! Run: cargo run --bin mock_suite

use colored::*;
use std::time::Duration;
use testkit_auth::CredentialConfig;
use testkit_harness::{HarnessConfig, SuiteRunner, TestCase};
use testkit_types::{AuthLevel, CaseError, FailureReport, Verdict};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("{}", "═".repeat(70).cyan());
    println!("{}", "  OFFLINE MOCK SUITE".cyan().bold());
    println!("{}", "  Futures Testkit Demo - Classification Walkthrough".cyan());
    println!("{}", "═".repeat(70).cyan());
    println!();

    let config = HarnessConfig::new().with_requests_per_second(50.0);
    let credentials = vec![CredentialConfig::hmac("demo-api-key", "demo-secret")];
    let mut suite = SuiteRunner::new(config, credentials);

    // A healthy public case
    suite.register(TestCase::new("Exchange Info", AuthLevel::None, |ctx| async move {
        ctx.call(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(())
        })
        .await
    }));

    // A healthy authenticated case
    suite.register(TestCase::new("Account Balance", AuthLevel::Read, |ctx| async move {
        ctx.call(async { Ok(()) }).await
    }));

    // An endpoint the testnet answers with a structured 404
    suite.register(TestCase::new("Asset Index", AuthLevel::None, |ctx| async move {
        ctx.call(async {
            Err(CaseError::Api(
                FailureReport::new("not found")
                    .with_status(404)
                    .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
            ))
        })
        .await
    }));

    // A generated-client URL bug: the reverse proxy serves its HTML 404 page
    suite.register(TestCase::new("Funding Info", AuthLevel::None, |ctx| async move {
        ctx.call(async {
            let page = format!(
                "<!DOCTYPE html><html><body><h1>404</h1>This page could not be found{}</body></html>",
                " ".repeat(20)
            );
            Err(CaseError::Api(
                FailureReport::new("undefined response type")
                    .with_status(404)
                    .with_body(page),
            ))
        })
        .await
    }));

    // A genuine failure
    suite.register(TestCase::new("Create Order", AuthLevel::Trade, |ctx| async move {
        ctx.call(async {
            Err(CaseError::Api(
                FailureReport::new("Precision is over the maximum defined for this asset")
                    .with_status(400)
                    .with_body(r#"{"code":-1111,"msg":"Precision is over the maximum defined for this asset."}"#),
            ))
        })
        .await
    }));

    let summary = suite.run_all().await;

    println!("  {:<20} {:<24} {}", "CASE".white().bold(), "CREDENTIAL".white().bold(), "VERDICT".white().bold());
    println!("  {}", "─".repeat(66));
    for record in suite.records() {
        let verdict = match record.verdict {
            Verdict::Pass => record.verdict.to_string().green(),
            Verdict::Fail => record.verdict.to_string().red(),
            _ => record.verdict.to_string().yellow(),
        };
        println!("  {:<20} {:<24} {}", record.test_name.cyan(), record.credential, verdict);
        if let Some(detail) = &record.detail {
            println!("  {:<20} {}", "", detail.dimmed());
        }
    }

    suite.print_summary();
}
