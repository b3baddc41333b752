//! `$package` groups: Measure/$package, Library/$cqfm.package and their
//! include-terminology variants.

use measure_repo_core::{
    ArtifactType, Bundle, ClosureCheck, MatchKind, Resource, find_entry_with, split_identifier,
};

use super::{INVALID_ID, RequestPlan, Scope, TestCase, TestGroup};
use crate::assertions::{Check, assert_bundle, assert_error, ensure};
use crate::client::{Exchange, FhirRequest};
use crate::config::InputField;
use crate::error::{AssertionFailure, MissingInput};
use crate::parameters::Parameters;

/// Name under which case 01 records its exchange for the closure case
const PACKAGE_REQUEST: &str = "package";

pub fn group(artifact: ArtifactType, include_terminology: bool) -> TestGroup {
    let (id, title, prefix) = match (artifact, include_terminology) {
        (ArtifactType::Measure, false) => ("measure_package", "Measure $package", "measure-package"),
        (ArtifactType::Library, false) => (
            "library_package",
            "Library $cqfm.package",
            "library-package",
        ),
        (ArtifactType::Measure, true) => (
            "measure_include_terminology",
            "Measure include terminology $package",
            "measure-include-terminology",
        ),
        (ArtifactType::Library, true) => (
            "library_include_terminology",
            "Library include terminology $package",
            "library-include-terminology",
        ),
    };
    let case_id = |n: u8| format!("{prefix}-{n:02}");

    let mut tests = vec![
        TestCase::new(
            case_id(1),
            "200 response and JSON Bundle body including root resource for POST by id in url",
            "returned response has status code 200 and valid JSON FHIR Bundle including the root resource in body",
            by_id_request,
            by_id_verify,
        ),
        TestCase::new(
            case_id(2),
            "200 response and JSON Bundle body for POST with url in body",
            "returned response has status code 200 and included root resource matches url parameter",
            by_url_request,
            by_url_verify,
        ),
        TestCase::new(
            case_id(3),
            "200 response and JSON Bundle body for POST with identifier in body",
            "returned response has status code 200 and included root resource matches identifier parameter",
            by_identifier_request,
            by_identifier_verify,
        ),
        TestCase::new(
            case_id(4),
            "200 response and JSON Bundle body for POST parameters url, identifier, and version in body and id in url",
            "returned response has status code 200 and included root resource matches parameters url, identifier, \
             and version. Verifies the server supports SHALL parameters for the operation",
            all_parameters_request,
            all_parameters_verify,
        ),
        TestCase::new(
            case_id(5),
            "All related artifacts present",
            "returned bundle includes all related artifacts for all libraries",
            |_| Ok(RequestPlan::Reuse(PACKAGE_REQUEST)),
            closure_verify,
        ),
        TestCase::new(
            case_id(6),
            "Throws 404 when no resource on server matches id",
            "returns 404 status code with OperationOutcome when no resource exists with passed-in id",
            |scope| {
                Ok(RequestPlan::send(FhirRequest::operation(operation_path(
                    scope,
                    Some(INVALID_ID),
                ))))
            },
            |_, exchange| assert_error(exchange, 404),
        ),
        TestCase::new(
            case_id(7),
            "Throws 400 when no id, url, or identifier provided",
            "returns 400 status code with OperationOutcome when no id, url, or identifier provided",
            |scope| Ok(RequestPlan::send(FhirRequest::operation(operation_path(scope, None)))),
            |_, exchange| assert_error(exchange, 400),
        ),
    ];

    if !include_terminology {
        tests.push(
            TestCase::new(
                case_id(8),
                "All related artifacts present including valuesets when include-terminology=true",
                "returned bundle includes all related artifacts for all libraries including valuesets \
                 with include-terminology=true",
                terminology_request,
                terminology_verify,
            )
            .optional(),
        );
    }

    TestGroup {
        id: id.to_string(),
        title: title.to_string(),
        description: format!(
            "Ensure measure repository service can execute the {} operation to the {} endpoint",
            operation_name(artifact, include_terminology),
            artifact
        ),
        artifact,
        include_terminology,
        tests: tests
            .into_iter()
            .map(|t| t.optional_if(include_terminology))
            .collect(),
    }
}

/// Library packaging predates the generic `$package` name
fn operation_name(artifact: ArtifactType, include_terminology: bool) -> &'static str {
    match (artifact, include_terminology) {
        (ArtifactType::Library, false) => "$cqfm.package",
        _ => "$package",
    }
}

/// `{Type}[/{id}]/{operation}[?include-terminology=true]`
fn operation_path(scope: &Scope<'_>, id: Option<&str>) -> String {
    let mut path = scope.resource_type().to_string();
    if let Some(id) = id {
        path.push('/');
        path.push_str(id);
    }
    path.push('/');
    path.push_str(operation_name(scope.artifact, scope.include_terminology));
    if scope.include_terminology {
        path.push_str("?include-terminology=true");
    }
    path
}

fn located<'a>(scope: &Scope<'_>, bundle: &'a Bundle, expected: &str, kind: MatchKind) -> Check<&'a Resource> {
    find_entry_with(
        bundle,
        scope.artifact,
        expected,
        kind,
        scope.checks.identifier_match,
    )
    .ok_or_else(|| {
        AssertionFailure::new(format!(
            "No {} found in bundle with {}: {}",
            scope.artifact, kind, expected
        ))
    })
}

fn closure_check(scope: &Scope<'_>, bundle: &Bundle, include_valuesets: bool) -> Check {
    let missing = ClosureCheck::new(include_valuesets)
        .with_reference_check(scope.checks.reference_check)
        .missing(bundle);
    let listed: Vec<String> = missing.iter().map(ToString::to_string).collect();
    ensure(
        missing.is_empty(),
        format!("Bundle is missing related artifacts: {}", listed.join(", ")),
    )
}

fn by_id_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let id = scope.require(InputField::Id)?;
    Ok(RequestPlan::record(
        FhirRequest::operation(operation_path(scope, Some(id))),
        PACKAGE_REQUEST,
    ))
}

fn by_id_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let bundle = assert_bundle(exchange)?;
    located(scope, &bundle, scope.require(InputField::Id)?, MatchKind::Id)?;
    Ok(())
}

fn by_url_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let url = scope.require(InputField::Url)?;
    Ok(RequestPlan::send(
        FhirRequest::operation(operation_path(scope, None)).with_body(Parameters::new().url("url", url)),
    ))
}

fn by_url_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let bundle = assert_bundle(exchange)?;
    located(scope, &bundle, scope.require(InputField::Url)?, MatchKind::Url)?;
    Ok(())
}

fn by_identifier_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let identifier = scope.require(InputField::Identifier)?;
    Ok(RequestPlan::send(
        FhirRequest::operation(operation_path(scope, None))
            .with_body(Parameters::new().string("identifier", identifier)),
    ))
}

fn by_identifier_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let bundle = assert_bundle(exchange)?;
    located(
        scope,
        &bundle,
        scope.require(InputField::Identifier)?,
        MatchKind::Identifier,
    )?;
    Ok(())
}

fn all_parameters_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let id = scope.require(InputField::Id)?;
    let params = Parameters::new()
        .url("url", scope.require(InputField::Url)?)
        .string("identifier", scope.require(InputField::Identifier)?)
        .optional_string("version", scope.version());
    Ok(RequestPlan::send(
        FhirRequest::operation(operation_path(scope, Some(id))).with_body(params),
    ))
}

fn all_parameters_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let bundle = assert_bundle(exchange)?;
    let id = scope.require(InputField::Id)?;
    let url = scope.require(InputField::Url)?;
    let identifier = scope.require(InputField::Identifier)?;

    let root = located(scope, &bundle, url, MatchKind::Url)?;
    let meta = root
        .meta()
        .ok_or_else(|| AssertionFailure::new("Root resource has no metadata"))?;

    ensure(
        meta.id.as_deref() == Some(id),
        format!("No {} found in bundle with id: {}", scope.artifact, id),
    )?;
    ensure(
        split_identifier(identifier).matches(&meta.identifier, scope.checks.identifier_match),
        format!(
            "No {} found in bundle with identifier: {}",
            scope.artifact, identifier
        ),
    )?;
    if let Some(version) = scope.version() {
        ensure(
            meta.version.as_deref() == Some(version),
            format!(
                "No {} found in bundle with version: {}",
                scope.artifact, version
            ),
        )?;
    }
    Ok(())
}

fn closure_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let bundle = assert_bundle(exchange)?;
    closure_check(scope, &bundle, scope.include_terminology)
}

fn terminology_request(scope: &Scope<'_>) -> Result<RequestPlan, MissingInput> {
    let id = scope.require(InputField::Id)?;
    let path = format!(
        "{}?include-terminology=true",
        operation_path(scope, Some(id))
    );
    Ok(RequestPlan::send(FhirRequest::operation(path)))
}

fn terminology_verify(scope: &Scope<'_>, exchange: &Exchange) -> Check {
    let bundle = assert_bundle(exchange)?;
    located(scope, &bundle, scope.require(InputField::Id)?, MatchKind::Id)?;
    closure_check(scope, &bundle, true)
}
