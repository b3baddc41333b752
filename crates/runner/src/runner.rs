//! Executes a suite against the server under test

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::client::{Exchange, FhirClient};
use crate::config::{CheckOptions, Config, SuiteInputs};
use crate::error::RunnerError;
use crate::report::{Outcome, RequestSummary, SuiteReport, TestResult};
use crate::suite::{RequestPlan, Scope, Suite, TestCase, TestGroup};

pub struct SuiteRunner {
    client: FhirClient,
    inputs: SuiteInputs,
    checks: CheckOptions,
}

impl SuiteRunner {
    pub fn new(config: Config) -> Result<Self, RunnerError> {
        Ok(Self {
            client: FhirClient::new(&config)?,
            inputs: config.inputs,
            checks: config.checks,
        })
    }

    /// Run every group in order. Test cases run sequentially.
    pub async fn run(&self, suite: &Suite) -> SuiteReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        tracing::info!(
            run_id = %run_id,
            suite = suite.id,
            base_url = %self.client.base_url(),
            tests = suite.test_count(),
            "Starting test run"
        );

        let mut results = Vec::with_capacity(suite.test_count());
        for group in &suite.groups {
            self.run_group(group, &mut results).await;
        }

        let report = SuiteReport::new(run_id, self.client.base_url(), started_at, results);
        tracing::info!(
            run_id = %run_id,
            pass = report.summary.pass,
            fail = report.summary.fail,
            skip = report.summary.skip,
            error = report.summary.error,
            "Test run finished"
        );
        report
    }

    async fn run_group(&self, group: &TestGroup, results: &mut Vec<TestResult>) {
        let scope = group.scope(&self.inputs, &self.checks);
        // Exchanges recorded by name, visible to later cases of this group only
        let mut recorded: HashMap<&'static str, Exchange> = HashMap::new();

        tracing::debug!(group = %group.id, "Running group");

        for test in &group.tests {
            let started = Instant::now();
            let (outcome, exchange) = self.run_case(test, &scope, &mut recorded).await;

            let result = TestResult {
                group: group.id.clone(),
                id: test.id.clone(),
                title: test.title.to_string(),
                optional: test.optional,
                outcome,
                request: exchange.map(|ex| RequestSummary {
                    method: ex.method,
                    path: ex.path,
                    status: ex.status,
                }),
                duration_ms: started.elapsed().as_millis() as u64,
            };

            match &result.outcome {
                Outcome::Pass | Outcome::Skip(_) => tracing::info!(
                    group = %result.group,
                    test = %result.id,
                    result = result.outcome.label(),
                    duration_ms = result.duration_ms,
                    "Test completed"
                ),
                Outcome::Fail(message) | Outcome::Error(message) => tracing::warn!(
                    group = %result.group,
                    test = %result.id,
                    result = result.outcome.label(),
                    optional = result.optional,
                    message = %message,
                    duration_ms = result.duration_ms,
                    "Test completed"
                ),
            }

            results.push(result);
        }
    }

    async fn run_case(
        &self,
        test: &TestCase,
        scope: &Scope<'_>,
        recorded: &mut HashMap<&'static str, Exchange>,
    ) -> (Outcome, Option<Exchange>) {
        let plan = match (test.request)(scope) {
            Ok(plan) => plan,
            Err(missing) => return (Outcome::Skip(missing.to_string()), None),
        };

        let exchange = match plan {
            RequestPlan::Send { request, record_as } => match self.client.send(&request).await {
                Ok(exchange) => {
                    if let Some(name) = record_as {
                        recorded.insert(name, exchange.clone());
                    }
                    exchange
                }
                Err(e) => return (Outcome::Error(e.to_string()), None),
            },
            RequestPlan::Reuse(name) => match recorded.get(name) {
                Some(exchange) => exchange.clone(),
                None => {
                    return (
                        Outcome::Skip(format!("request '{}' was not made", name)),
                        None,
                    );
                }
            },
        };

        let outcome = match (test.verify)(scope, &exchange) {
            Ok(()) => Outcome::Pass,
            Err(failure) => Outcome::Fail(failure.to_string()),
        };
        (outcome, Some(exchange))
    }
}
