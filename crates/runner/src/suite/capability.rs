//! CapabilityStatement group

use measure_repo_core::{ArtifactType, CapabilityStatement};

use super::{RequestPlan, TestCase, TestGroup};
use crate::assertions::{Check, assert_response_status, assert_resource_type, assert_valid_json, ensure};
use crate::client::{Exchange, FhirRequest};
use crate::error::AssertionFailure;

pub fn group() -> TestGroup {
    TestGroup {
        id: "capability_statement".to_string(),
        title: "Capability Statement".to_string(),
        description: "Verify that the server has a CapabilityStatement".to_string(),
        artifact: ArtifactType::Measure,
        include_terminology: false,
        tests: vec![
            TestCase::new(
                "capability_statement_read",
                "Read CapabilityStatement",
                "Read CapabilityStatement from /metadata endpoint",
                |_| Ok(RequestPlan::send(FhirRequest::get("metadata"))),
                |_, exchange| {
                    assert_response_status(exchange, 200)?;
                    assert_resource_type(exchange, "CapabilityStatement")
                },
            ),
            TestCase::new(
                "capability_statement_resources",
                "CapabilityStatement declares Measure and Library",
                "The server-mode rest entry of the CapabilityStatement lists Measure and Library resources \
                 with the read interaction and the repository operations",
                |_| Ok(RequestPlan::send(FhirRequest::get("metadata"))),
                resources_verify,
            )
            .optional(),
        ],
    }
}

/// Interaction and operations each artifact endpoint must declare
const REQUIRED: [(ArtifactType, &[&[&str]]); 2] = [
    (ArtifactType::Measure, &[&["$package"], &["$data-requirements"]]),
    (
        ArtifactType::Library,
        &[&["$cqfm.package", "$package"], &["$data-requirements"]],
    ),
];

fn resources_verify(_: &super::Scope<'_>, exchange: &Exchange) -> Check {
    assert_response_status(exchange, 200)?;
    let json = assert_valid_json(exchange)?;
    let statement: CapabilityStatement = serde_json::from_value(json)
        .map_err(|e| AssertionFailure::new(format!("Malformed CapabilityStatement: {}", e)))?;

    let mut missing = Vec::new();
    for (artifact, operations) in REQUIRED {
        let Some(resource) = statement.server_resource(artifact.as_str()) else {
            missing.push(artifact.to_string());
            continue;
        };
        if !resource.supports_interaction("read") {
            missing.push(format!("{} read", artifact));
        }
        // Any one of the alternative names satisfies an operation
        for alternatives in operations {
            if !alternatives.iter().any(|op| resource.supports_operation(op)) {
                missing.push(format!("{} {}", artifact, alternatives.join(" or ")));
            }
        }
    }

    ensure(
        missing.is_empty(),
        format!("CapabilityStatement does not declare: {}", missing.join(", ")),
    )
}
