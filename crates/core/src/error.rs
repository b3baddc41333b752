use thiserror::Error;

/// Errors raised while decoding FHIR JSON into typed resources
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Missing required field: resourceType")]
    MissingResourceType,

    #[error("Expected resourceType '{expected}', got '{found}'")]
    UnexpectedType { expected: String, found: String },

    #[error("Malformed {resource_type} resource: {source}")]
    Malformed {
        resource_type: String,
        #[source]
        source: serde_json::Error,
    },
}
