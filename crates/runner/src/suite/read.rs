//! Read-by-id groups for Measure and Library

use measure_repo_core::ArtifactType;

use super::{INVALID_ID, RequestPlan, Scope, TestCase, TestGroup};
use crate::assertions::{Check, assert_error, assert_success, ensure};
use crate::client::{Exchange, FhirRequest};
use crate::config::InputField;
use crate::error::MissingInput;

pub fn group(artifact: ArtifactType) -> TestGroup {
    let (id, prefix) = match artifact {
        ArtifactType::Measure => ("measure_group", "read-by-id-measure"),
        ArtifactType::Library => ("library_group", "read-by-id-library"),
    };

    TestGroup {
        id: id.to_string(),
        title: format!("Measure Repository Service {} Group", artifact),
        description: format!(
            "Ensure measure repository service can retrieve {} resources by the server-defined id",
            artifact
        ),
        artifact,
        include_terminology: false,
        tests: vec![
            TestCase::new(
                format!("{prefix}-01"),
                "Server returns 200 response status and correct resource from the read interaction",
                "This test verifies that the resource can be read from the server.",
                read_request,
                read_verify,
            ),
            TestCase::new(
                format!("{prefix}-02"),
                "Server returns 404 response status when the resource is not available on the server",
                "This test verifies that the server appropriately returns 404 response status for a \
                 resource whose id cannot be found in the server's database.",
                |scope| Ok(RequestPlan::send(FhirRequest::read(scope.resource_type(), INVALID_ID))),
                |_, exchange| assert_error(exchange, 404),
            ),
        ],
    }
}

fn read_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let id = scope.require(InputField::Id)?;
    Ok(RequestPlan::send(FhirRequest::read(scope.resource_type(), id)))
}

fn read_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let expected = scope.require(InputField::Id)?;
    let resource = assert_success(exchange, scope.resource_type(), 200)?;
    let received = resource.meta().and_then(|m| m.id.as_deref());
    ensure(
        received == Some(expected),
        format!(
            "Requested resource with id {}, received resource with id {}",
            expected,
            received.unwrap_or("none")
        ),
    )
}
