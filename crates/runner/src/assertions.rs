//! Assertion primitives over a request/response exchange.
//!
//! Every check returns `Result` so verifiers compose them with `?`; the first
//! failing check becomes the test's failure message.

use measure_repo_core::{Bundle, IssueSeverity, Library, Resource, data_requirements};
use serde_json::Value as JsonValue;

use crate::client::Exchange;
use crate::error::AssertionFailure;

pub type Check<T = ()> = Result<T, AssertionFailure>;

/// Fail with `message` unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> Check {
    if condition {
        Ok(())
    } else {
        Err(AssertionFailure::new(message))
    }
}

pub fn assert_response_status(exchange: &Exchange, expected: u16) -> Check {
    ensure(
        exchange.status == expected,
        format!(
            "Unexpected response status: expected {}, but received {}",
            expected, exchange.status
        ),
    )
}

pub fn assert_valid_json(exchange: &Exchange) -> Check<JsonValue> {
    exchange
        .json()
        .map_err(|e| AssertionFailure::new(format!("Invalid JSON: {}", e)))
}

pub fn assert_resource_type(exchange: &Exchange, expected: &str) -> Check {
    let found = exchange.resource_type();
    ensure(
        found.as_deref() == Some(expected),
        format!(
            "Unexpected resource type: expected {}, but received {}",
            expected,
            found.as_deref().unwrap_or("none")
        ),
    )
}

/// Status, resource type, then JSON validity; returns the decoded resource
pub fn assert_success(exchange: &Exchange, resource_type: &str, status: u16) -> Check<Resource> {
    assert_response_status(exchange, status)?;
    assert_resource_type(exchange, resource_type)?;
    assert_valid_json(exchange)?;
    exchange
        .resource()
        .map_err(|e| AssertionFailure::new(e.to_string()))
}

/// A successful response carrying a Bundle
pub fn assert_bundle(exchange: &Exchange) -> Check<Bundle> {
    assert_response_status(exchange, 200)?;
    assert_resource_type(exchange, "Bundle")?;
    assert_valid_json(exchange)?;
    exchange
        .bundle()
        .map_err(|e| AssertionFailure::new(e.to_string()))
}

/// An OperationOutcome with the expected status whose first issue is an error
pub fn assert_error(exchange: &Exchange, expected_status: u16) -> Check {
    assert_response_status(exchange, expected_status)?;
    assert_valid_json(exchange)?;
    let resource = exchange
        .resource()
        .map_err(|e| AssertionFailure::new(e.to_string()))?;
    let outcome = resource.as_outcome().ok_or_else(|| {
        AssertionFailure::new(format!(
            "Expected an OperationOutcome, but received {}",
            resource.resource_type()
        ))
    })?;
    ensure(
        outcome.first_severity() == Some(IssueSeverity::Error),
        "Expected the first OperationOutcome issue to have severity 'error'",
    )
}

/// A `module-definition` Library; `strict` also demands data requirements
pub fn assert_data_requirements_success(exchange: &Exchange, strict: bool) -> Check<Library> {
    let resource = assert_success(exchange, "Library", 200)?;
    let library = resource
        .as_library()
        .cloned()
        .ok_or_else(|| AssertionFailure::new("Expected a Library"))?;

    ensure(
        data_requirements::is_module_definition(&library),
        "Library type does not contain a module-definition coding",
    )?;
    if strict {
        ensure(
            !library.data_requirement.is_empty(),
            "Library does not contain any dataRequirement",
        )?;
    }
    Ok(library)
}

pub fn assert_data_requirements_failure(exchange: &Exchange, expected_status: u16) -> Check {
    assert_error(exchange, expected_status)
}
