//! `$data-requirements` groups for Measure and Library

use measure_repo_core::{ArtifactType, data_requirements};

use super::{INVALID_ID, RequestPlan, Scope, TestCase, TestGroup};
use crate::assertions::{Check, assert_data_requirements_failure, assert_data_requirements_success};
use crate::client::{Exchange, FhirRequest};
use crate::config::InputField;
use crate::error::MissingInput;
use crate::parameters::Parameters;

const OPERATION: &str = "$data-requirements";

pub fn group(artifact: ArtifactType) -> TestGroup {
    match artifact {
        ArtifactType::Measure => measure_group(),
        ArtifactType::Library => library_group(),
    }
}

fn measure_group() -> TestGroup {
    TestGroup {
        id: "measure_data_requirements".to_string(),
        title: "Measure $data-requirements".to_string(),
        description: "Ensure measure repository service can run $data-requirements operation".to_string(),
        artifact: ArtifactType::Measure,
        include_terminology: false,
        tests: vec![
            TestCase::new(
                "data-requirements-01",
                "Check $data-requirements with id returns 200",
                "$data-requirements returns 200OK and Library of type module-definition when given Measure id",
                by_id_request,
                success_verify,
            ),
            TestCase::new(
                "data-requirements-02",
                "Check $data-requirements with url returns 200",
                "$data-requirements returns 200OK and Library of type module-definition when passed in a url",
                by_url_request,
                success_verify,
            ),
            TestCase::new(
                "data-requirements-03",
                "Check $data-requirements with identifier returns 200",
                "$data-requirements returns 200OK and Library of type module-definition when passed in an identifier",
                by_identifier_request,
                success_verify,
            ),
            TestCase::new(
                "data-requirements-04",
                "Check $data-requirements accepts periodStart and periodEnd parameters",
                "$data-requirements returns 200 when passed periodStart and periodEnd parameters",
                |scope| {
                    let id = scope.require(InputField::Id)?;
                    let path = format!(
                        "{}?periodStart=2019-01-01&periodEnd=2020-01-01",
                        operation_path(scope, Some(id))
                    );
                    Ok(RequestPlan::send(request(scope, path)))
                },
                success_verify,
            ),
            TestCase::new(
                "data-requirements-05",
                "Check $data-requirements returns 404 for invalid measure id",
                "$data-requirements returns 404 when passed a measure id which is not in the system",
                invalid_id_request,
                |_, exchange| assert_data_requirements_failure(exchange, 404),
            ),
            TestCase::new(
                "data-requirements-06",
                "Check $data-requirements returns 400 for no identification info",
                "$data-requirements returns 400 when no id, url, or identifier is provided",
                no_identification_request,
                |_, exchange| assert_data_requirements_failure(exchange, 400),
            ),
            TestCase::new(
                "data-requirements-07",
                "Check $data-requirements returns 400 for invalid parameter",
                "$data-requirements returns 400 when passed an invalid parameter",
                |scope| {
                    let path = format!("{}?invalid=false", operation_path(scope, Some(INVALID_ID)));
                    Ok(RequestPlan::send(request(scope, path)))
                },
                |_, exchange| assert_data_requirements_failure(exchange, 400),
            ),
        ],
    }
}

fn library_group() -> TestGroup {
    TestGroup {
        id: "library_data_requirements".to_string(),
        title: "Library $data-requirements".to_string(),
        description: "Ensure measure repository service can run Library/$data-requirements operation"
            .to_string(),
        artifact: ArtifactType::Library,
        include_terminology: false,
        tests: vec![
            TestCase::new(
                "library-data-requirements-01",
                "200 response and JSON Library body for POST by id in url",
                "returned response has status code 200 and valid JSON FHIR Library with data requirement in body",
                by_id_request,
                success_verify,
            ),
            TestCase::new(
                "library-data-requirements-02",
                "200 response and JSON Library body for POST with url in body",
                "returned response has status code 200.",
                by_url_request,
                success_verify,
            ),
            TestCase::new(
                "library-data-requirements-03",
                "200 response and JSON Library body for POST with identifier in body",
                "returned response has status code 200.",
                by_identifier_request,
                success_verify,
            ),
            TestCase::new(
                "library-data-requirements-04",
                "200 response and JSON Library body for POST parameters url, identifier, and version in body and id in url",
                "returned response has status code 200.",
                |scope| {
                    let id = scope.require(InputField::Id)?;
                    let params = Parameters::new()
                        .url("url", scope.require(InputField::Url)?)
                        .string("identifier", scope.require(InputField::Identifier)?)
                        .optional_string("version", scope.version());
                    Ok(RequestPlan::send(
                        FhirRequest::operation(operation_path(scope, Some(id))).with_body(params),
                    ))
                },
                success_verify,
            ),
            TestCase::new(
                "library-data-requirements-05",
                "Throws 404 when no Library on server matches id",
                "returns 404 status code with OperationOutcome when no Library exists with passed-in id",
                invalid_id_request,
                |_, exchange| assert_data_requirements_failure(exchange, 404),
            ),
            TestCase::new(
                "library-data-requirements-06",
                "Throws 400 when no id, url, or identifier provided",
                "returns 400 status code with OperationOutcome when no id, url, or identifier provided",
                no_identification_request,
                |_, exchange| assert_data_requirements_failure(exchange, 400),
            ),
            TestCase::new(
                "library-data-requirements-07",
                "Throws 400 when id is included in both the path and as a FHIR parameter",
                "returns 400 status code with OperationOutcome when id is given in the path and the body",
                |scope| {
                    let id = scope.require(InputField::Id)?;
                    Ok(RequestPlan::send(
                        FhirRequest::operation(operation_path(scope, Some(id)))
                            .with_body(Parameters::new().string("id", id)),
                    ))
                },
                |_, exchange| assert_data_requirements_failure(exchange, 400),
            ),
        ],
    }
}

fn operation_path(scope: &Scope<'_>, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{}/{}/{}", scope.resource_type(), id, OPERATION),
        None => format!("{}/{}", scope.resource_type(), OPERATION),
    }
}

/// Measure requests always carry a (possibly empty) Parameters body
fn request(scope: &Scope<'_>, path: String) -> FhirRequest {
    let request = FhirRequest::operation(path);
    match scope.artifact {
        ArtifactType::Measure => request.with_body(Parameters::new()),
        ArtifactType::Library => request,
    }
}

fn by_id_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let id = scope.require(InputField::Id)?;
    Ok(RequestPlan::send(request(scope, operation_path(scope, Some(id)))))
}

fn by_url_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let params = Parameters::new()
        .url("url", scope.require(InputField::Url)?)
        .optional_string("version", scope.version());
    Ok(RequestPlan::send(
        FhirRequest::operation(operation_path(scope, None)).with_body(params),
    ))
}

fn by_identifier_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let params = Parameters::new().string("identifier", scope.require(InputField::Identifier)?);
    Ok(RequestPlan::send(
        FhirRequest::operation(operation_path(scope, None)).with_body(params),
    ))
}

fn invalid_id_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    Ok(RequestPlan::send(request(
        scope,
        operation_path(scope, Some(INVALID_ID)),
    )))
}

fn no_identification_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    Ok(RequestPlan::send(request(scope, operation_path(scope, None))))
}

/// Library results must also list their data requirements
fn success_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let strict = scope.artifact == ArtifactType::Library;
    let library = assert_data_requirements_success(exchange, strict)?;
    tracing::debug!(
        path = %exchange.path,
        requirements = ?data_requirements::summarize(&library),
        "Data requirements returned"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckOptions, SuiteInputs};

    #[test]
    fn measure_requests_carry_empty_parameters() {
        let inputs = SuiteInputs::default();
        let checks = CheckOptions::default();
        let group = group(ArtifactType::Measure);
        let scope = group.scope(&inputs, &checks);

        let RequestPlan::Send { request, .. } = no_identification_request(&scope).unwrap() else {
            panic!("expected a request");
        };
        assert_eq!(request.path, "Measure/$data-requirements");
        assert_eq!(request.body, Some(Parameters::new()));
    }

    #[test]
    fn library_requests_have_no_body() {
        let inputs = SuiteInputs::default();
        let checks = CheckOptions::default();
        let group = group(ArtifactType::Library);
        let scope = group.scope(&inputs, &checks);

        let RequestPlan::Send { request, .. } = invalid_id_request(&scope).unwrap() else {
            panic!("expected a request");
        };
        assert_eq!(request.path, "Library/INVALID_ID/$data-requirements");
        assert!(request.body.is_none());
    }

    #[test]
    fn period_case_appends_query() {
        let mut inputs = SuiteInputs::default();
        inputs.measure.id = Some("m1".to_string());
        let checks = CheckOptions::default();
        let group = group(ArtifactType::Measure);
        let scope = group.scope(&inputs, &checks);

        let case = group
            .tests
            .iter()
            .find(|t| t.id == "data-requirements-04")
            .unwrap();
        let RequestPlan::Send { request, .. } = (case.request)(&scope).unwrap() else {
            panic!("expected a request");
        };
        assert_eq!(
            request.path,
            "Measure/m1/$data-requirements?periodStart=2019-01-01&periodEnd=2020-01-01"
        );
    }
}
