//! HTTP client for the FHIR server under test

use std::sync::Arc;

use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::NotKeyed};
use measure_repo_core::{Bundle, Resource, ResourceError};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::RunnerError;
use crate::parameters::Parameters;

/// FHIR JSON media type sent on every request
pub const FHIR_JSON: &str = "application/fhir+json";

/// Rate limiter shared by every request of a run
pub type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// A request relative to the server base url
#[derive(Debug, Clone, PartialEq)]
pub struct FhirRequest {
    pub method: Method,
    /// Path and optional query, e.g. `Measure/x/$package?include-terminology=true`
    pub path: String,
    pub body: Option<Parameters>,
}

impl FhirRequest {
    /// GET `{resource_type}/{id}`
    pub fn read(resource_type: &str, id: &str) -> Self {
        Self::get(format!("{}/{}", resource_type, id))
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// POST to an operation endpoint without a body
    pub fn operation(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Parameters) -> Self {
        self.body = Some(body);
        self
    }
}

/// A completed request and the raw response
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl Exchange {
    pub fn json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// `resourceType` of the body, if it is a JSON object carrying one
    pub fn resource_type(&self) -> Option<String> {
        self.json()
            .ok()?
            .get("resourceType")?
            .as_str()
            .map(str::to_string)
    }

    pub fn resource(&self) -> Result<Resource, ResourceError> {
        let value = self.json().map_err(|source| ResourceError::Malformed {
            resource_type: "unknown".to_string(),
            source,
        })?;
        Resource::from_json(value)
    }

    pub fn bundle(&self) -> Result<Bundle, ResourceError> {
        let found = self.resource_type().ok_or(ResourceError::MissingResourceType)?;
        if found != "Bundle" {
            return Err(ResourceError::UnexpectedType {
                expected: "Bundle".to_string(),
                found,
            });
        }
        serde_json::from_str(&self.body).map_err(|source| ResourceError::Malformed {
            resource_type: "Bundle".to_string(),
            source,
        })
    }
}

/// Client for the measure repository service under test
#[derive(Clone)]
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
    limiter: SharedRateLimiter,
}

impl FhirClient {
    pub fn new(config: &Config) -> Result<Self, RunnerError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(config.rate_limit_rps))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, waiting for the rate limiter first.
    ///
    /// Any HTTP status is a successful exchange; only transport failures
    /// are errors.
    pub async fn send(&self, request: &FhirRequest) -> Result<Exchange, RunnerError> {
        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, request.path);
        let builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        }
        .header(ACCEPT, FHIR_JSON);

        let builder = match &request.body {
            Some(params) => builder
                .header(CONTENT_TYPE, FHIR_JSON)
                .body(serde_json::to_vec(params)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(
            method = ?request.method,
            path = %request.path,
            status = status,
            bytes = body.len(),
            "FHIR request completed"
        );

        Ok(Exchange {
            method: request.method,
            path: request.path.clone(),
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(status: u16, body: &str) -> Exchange {
        Exchange {
            method: Method::Post,
            path: "Measure/$package".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn request_builders() {
        let read = FhirRequest::read("Library", "abc");
        assert_eq!(read.method, Method::Get);
        assert_eq!(read.path, "Library/abc");

        let op = FhirRequest::operation("Measure/$package").with_body(Parameters::new());
        assert_eq!(op.method, Method::Post);
        assert!(op.body.is_some());
    }

    #[test]
    fn bundle_requires_bundle_type() {
        let err = exchange(200, r#"{"resourceType": "Measure"}"#)
            .bundle()
            .unwrap_err();
        assert!(matches!(err, ResourceError::UnexpectedType { .. }));

        let bundle = exchange(200, r#"{"resourceType": "Bundle", "entry": []}"#)
            .bundle()
            .unwrap();
        assert!(bundle.entry.is_empty());
    }

    #[test]
    fn invalid_json_has_no_resource_type() {
        let ex = exchange(500, "<html>oops</html>");
        assert!(ex.json().is_err());
        assert_eq!(ex.resource_type(), None);
        assert!(ex.resource().is_err());
    }
}
