//! The conformance suite as plain test-case records.
//!
//! A case is a request builder plus a verifier. Builders read the run's
//! inputs and either describe a request or name an earlier recorded one;
//! verifiers inspect the resulting exchange.

mod capability;
mod data_requirements;
mod package;
mod read;

use measure_repo_core::ArtifactType;

use crate::client::{Exchange, FhirRequest};
use crate::config::{CheckOptions, InputField, SuiteInputs};
use crate::error::{AssertionFailure, MissingInput};

/// Id the server under test is expected not to know
pub const INVALID_ID: &str = "INVALID_ID";

/// What a case sees while building its request and verifying the answer
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub inputs: &'a SuiteInputs,
    pub checks: &'a CheckOptions,
    pub artifact: ArtifactType,
    pub include_terminology: bool,
}

impl Scope<'_> {
    pub fn require(&self, field: InputField) -> Result<&str, MissingInput> {
        self.inputs.require(self.artifact, field)
    }

    pub fn version(&self) -> Option<&str> {
        self.inputs.version(self.artifact)
    }

    pub fn resource_type(&self) -> &'static str {
        self.artifact.as_str()
    }
}

/// How a case obtains its exchange
#[derive(Debug, Clone)]
pub enum RequestPlan {
    /// Send a request, optionally recording the exchange under a name
    Send {
        request: FhirRequest,
        record_as: Option<&'static str>,
    },
    /// Reuse an exchange recorded earlier in the same group run
    Reuse(&'static str),
}

impl RequestPlan {
    pub fn send(request: FhirRequest) -> Self {
        RequestPlan::Send {
            request,
            record_as: None,
        }
    }

    pub fn record(request: FhirRequest, name: &'static str) -> Self {
        RequestPlan::Send {
            request,
            record_as: Some(name),
        }
    }
}

pub type RequestFn = fn(&Scope<'_>) -> Result<RequestPlan, MissingInput>;
pub type VerifyFn = fn(&Scope<'_>, &Exchange) -> Result<(), AssertionFailure>;

pub struct TestCase {
    pub id: String,
    pub title: &'static str,
    pub description: &'static str,
    pub optional: bool,
    pub request: RequestFn,
    pub verify: VerifyFn,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        title: &'static str,
        description: &'static str,
        request: RequestFn,
        verify: VerifyFn,
    ) -> Self {
        Self {
            id: id.into(),
            title,
            description,
            optional: false,
            request,
            verify,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn optional_if(self, optional: bool) -> Self {
        if optional { self.optional() } else { self }
    }
}

pub struct TestGroup {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Artifact the cases address (capability cases ignore it)
    pub artifact: ArtifactType,
    pub include_terminology: bool,
    pub tests: Vec<TestCase>,
}

impl TestGroup {
    pub fn scope<'a>(&self, inputs: &'a SuiteInputs, checks: &'a CheckOptions) -> Scope<'a> {
        Scope {
            inputs,
            checks,
            artifact: self.artifact,
            include_terminology: self.include_terminology,
        }
    }
}

pub struct Suite {
    pub id: &'static str,
    pub title: &'static str,
    pub groups: Vec<TestGroup>,
}

impl Suite {
    /// Every group of the measure repository service suite
    pub fn standard() -> Self {
        Self {
            id: "measure_repository_service_test_suite",
            title: "Measure Repository Service Test Suite",
            groups: vec![
                capability::group(),
                read::group(ArtifactType::Measure),
                read::group(ArtifactType::Library),
                package::group(ArtifactType::Measure, false),
                package::group(ArtifactType::Library, false),
                package::group(ArtifactType::Measure, true),
                package::group(ArtifactType::Library, true),
                data_requirements::group(ArtifactType::Measure),
                data_requirements::group(ArtifactType::Library),
            ],
        }
    }

    /// Keep only the named groups, in suite order
    pub fn select(mut self, group_ids: &[String]) -> Self {
        self.groups.retain(|g| group_ids.iter().any(|id| *id == g.id));
        self
    }

    pub fn test_count(&self) -> usize {
        self.groups.iter().map(|g| g.tests.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn case_ids_are_unique() {
        let suite = Suite::standard();
        let mut seen = HashSet::new();
        for group in &suite.groups {
            for test in &group.tests {
                assert!(seen.insert(test.id.clone()), "duplicate id {}", test.id);
            }
        }
        assert_eq!(seen.len(), suite.test_count());
    }

    #[test]
    fn select_keeps_suite_order() {
        let suite = Suite::standard().select(&[
            "library_package".to_string(),
            "measure_group".to_string(),
            "no_such_group".to_string(),
        ]);
        let ids: Vec<&str> = suite.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["measure_group", "library_package"]);
    }

    #[test]
    fn terminology_groups_are_optional() {
        let suite = Suite::standard();
        for group in suite.groups.iter().filter(|g| g.include_terminology) {
            assert!(group.tests.iter().all(|t| t.optional), "{}", group.id);
        }
    }

    #[test]
    fn missing_inputs_stop_request_building() {
        let suite = Suite::standard();
        let inputs = SuiteInputs::default();
        let checks = CheckOptions::default();
        let group = suite.groups.iter().find(|g| g.id == "measure_package").unwrap();
        let scope = group.scope(&inputs, &checks);

        let first = &group.tests[0];
        let err = (first.request)(&scope).unwrap_err();
        assert_eq!(err, MissingInput("measure_id"));
    }
}
