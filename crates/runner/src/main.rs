//! measure-repo-runner: runs the measure repository service suite and prints
//! the JSON report to stdout.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use measure_repo_runner::{Config, Suite, SuiteRunner};

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::from(2);
        }
    };

    let suite = match &config.groups {
        Some(groups) => Suite::standard().select(groups),
        None => Suite::standard(),
    };
    if suite.groups.is_empty() {
        tracing::error!("SUITE_GROUPS matched no test groups");
        return ExitCode::from(2);
    }
    tracing::info!(
        "Rate limiting: {} requests/second, timeout {:?}",
        config.rate_limit_rps,
        config.request_timeout
    );

    let runner = match SuiteRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::from(2);
        }
    };

    let report = runner.run(&suite).await;

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode report");
            return ExitCode::from(2);
        }
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
