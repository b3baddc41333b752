//! Run results and the JSON report

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::client::Method;

/// Result of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "message", rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail(String),
    /// A required input or prior request was missing
    Skip(String),
    /// The request could not be completed
    Error(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail(_) => "fail",
            Outcome::Skip(_) => "skip",
            Outcome::Error(_) => "error",
        }
    }
}

/// The request a test case made (or reused)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub method: Method,
    pub path: String,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub group: String,
    pub id: String,
    pub title: String,
    pub optional: bool,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSummary>,
    pub duration_ms: u64,
}

impl TestResult {
    /// Failed or errored, and not optional
    pub fn is_blocking(&self) -> bool {
        !self.optional && matches!(self.outcome, Outcome::Fail(_) | Outcome::Error(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
    pub error: usize,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub run_id: Uuid,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: Summary,
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    pub fn new(run_id: Uuid, base_url: &str, started_at: DateTime<Utc>, results: Vec<TestResult>) -> Self {
        let mut summary = Summary::default();
        for result in &results {
            match result.outcome {
                Outcome::Pass => summary.pass += 1,
                Outcome::Fail(_) => summary.fail += 1,
                Outcome::Skip(_) => summary.skip += 1,
                Outcome::Error(_) => summary.error += 1,
            }
        }

        Self {
            run_id,
            base_url: base_url.to_string(),
            started_at,
            finished_at: Utc::now(),
            summary,
            results,
        }
    }

    /// No required test failed or errored
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(TestResult::is_blocking)
    }

    pub fn result(&self, id: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.id == id)
    }
}
