//! Typed view of the FHIR resources a measure repository returns.
//!
//! Only the elements the conformance checks read are modelled; everything
//! else in the JSON is ignored during decoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ResourceError;
use crate::outcome::OperationOutcome;

/// FHIR Identifier (system + value)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    pub fn new(system: Option<&str>, value: Option<&str>) -> Self {
        Self {
            system: system.map(str::to_string),
            value: value.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Metadata shared by every canonical knowledge artifact
/// (Measure, Library, ValueSet, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,
}

/// FHIR Measure resource (simplified)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    #[serde(flatten)]
    pub meta: ArtifactMeta,
}

/// A dependency or citation declared by a Library.
///
/// A missing `type` decodes as empty so one bad entry does not reject the
/// whole Bundle; such entries are never dependencies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelatedArtifact {
    #[serde(rename = "type", default)]
    pub artifact_type: String,

    /// Canonical reference, `url` or `url|version`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl RelatedArtifact {
    pub fn is_depends_on(&self) -> bool {
        self.artifact_type == "depends-on"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<Coding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataRequirement {
    #[serde(rename = "type", default)]
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_filter: Vec<CodeFilter>,
}

/// FHIR Library resource (simplified)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    #[serde(flatten)]
    pub meta: ArtifactMeta,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub library_type: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_artifact: Vec<RelatedArtifact>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_requirement: Vec<DataRequirement>,
}

impl Library {
    /// Whether `type.coding` carries the given code
    pub fn has_type_code(&self, code: &str) -> bool {
        self.library_type
            .iter()
            .flat_map(|t| t.coding.iter())
            .any(|c| c.code.as_deref() == Some(code))
    }
}

/// FHIR ValueSet resource (metadata only)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValueSet {
    #[serde(flatten)]
    pub meta: ArtifactMeta,
}

/// Any resource type the checks do not inspect in detail
#[derive(Debug, Clone, PartialEq)]
pub struct OtherResource {
    pub resource_type: String,
    pub meta: ArtifactMeta,
}

/// A decoded FHIR resource, tagged by `resourceType`
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Measure(Measure),
    Library(Library),
    ValueSet(ValueSet),
    OperationOutcome(OperationOutcome),
    Other(OtherResource),
}

impl Resource {
    /// Decode a resource from JSON, dispatching on `resourceType`
    pub fn from_json(value: JsonValue) -> Result<Self, ResourceError> {
        let resource_type = value
            .get("resourceType")
            .and_then(JsonValue::as_str)
            .ok_or(ResourceError::MissingResourceType)?
            .to_string();

        let decoded = match resource_type.as_str() {
            "Measure" => Resource::Measure(decode(&resource_type, value)?),
            "Library" => Resource::Library(decode(&resource_type, value)?),
            "ValueSet" => Resource::ValueSet(decode(&resource_type, value)?),
            "OperationOutcome" => Resource::OperationOutcome(decode(&resource_type, value)?),
            _ => {
                // Shapes differ across other types (Bundle.identifier is not a list)
                let meta = serde_json::from_value(value).unwrap_or_default();
                Resource::Other(OtherResource {
                    resource_type,
                    meta,
                })
            }
        };
        Ok(decoded)
    }

    pub fn resource_type(&self) -> &str {
        match self {
            Resource::Measure(_) => "Measure",
            Resource::Library(_) => "Library",
            Resource::ValueSet(_) => "ValueSet",
            Resource::OperationOutcome(_) => "OperationOutcome",
            Resource::Other(other) => &other.resource_type,
        }
    }

    /// Artifact metadata, absent for OperationOutcome
    pub fn meta(&self) -> Option<&ArtifactMeta> {
        match self {
            Resource::Measure(m) => Some(&m.meta),
            Resource::Library(l) => Some(&l.meta),
            Resource::ValueSet(v) => Some(&v.meta),
            Resource::OperationOutcome(_) => None,
            Resource::Other(o) => Some(&o.meta),
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.meta().and_then(|m| m.url.as_deref())
    }

    pub fn version(&self) -> Option<&str> {
        self.meta().and_then(|m| m.version.as_deref())
    }

    pub fn as_measure(&self) -> Option<&Measure> {
        match self {
            Resource::Measure(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_library(&self) -> Option<&Library> {
        match self {
            Resource::Library(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_outcome(&self) -> Option<&OperationOutcome> {
        match self {
            Resource::OperationOutcome(o) => Some(o),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Resource::from_json(value).map_err(serde::de::Error::custom)
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    resource_type: &str,
    value: JsonValue,
) -> Result<T, ResourceError> {
    serde_json::from_value(value).map_err(|source| ResourceError::Malformed {
        resource_type: resource_type.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_library_with_dependencies() {
        let resource = Resource::from_json(json!({
            "resourceType": "Library",
            "id": "lib-1",
            "url": "http://example.com/Library/lib-1",
            "version": "1.0.0",
            "type": {"coding": [{"code": "logic-library"}]},
            "relatedArtifact": [
                {"type": "depends-on", "resource": "http://example.com/Library/dep|2.0.0"},
                {"type": "citation", "display": "Some paper"}
            ]
        }))
        .unwrap();

        let library = resource.as_library().unwrap();
        assert_eq!(library.meta.id.as_deref(), Some("lib-1"));
        assert_eq!(resource.version(), Some("1.0.0"));
        assert!(library.has_type_code("logic-library"));
        assert_eq!(library.related_artifact.len(), 2);
        assert_eq!(library.related_artifact[1].resource, None);
    }

    #[test]
    fn typeless_related_artifact_still_decodes() {
        let resource = Resource::from_json(json!({
            "resourceType": "Library",
            "id": "lib-1",
            "relatedArtifact": [
                {"resource": "http://example.com/Library/dep"},
                {"type": "depends-on", "resource": "http://example.com/Library/other"}
            ],
            "dataRequirement": [{"codeFilter": [{"path": "code"}]}]
        }))
        .unwrap();

        let library = resource.as_library().unwrap();
        assert!(!library.related_artifact[0].is_depends_on());
        assert!(library.related_artifact[1].is_depends_on());
        assert_eq!(library.data_requirement[0].data_type, "");
    }

    #[test]
    fn measure_type_list_does_not_break_decoding() {
        // Measure.type is a list, unlike Library.type
        let resource = Resource::from_json(json!({
            "resourceType": "Measure",
            "id": "m1",
            "type": [{"coding": [{"code": "process"}]}],
            "identifier": [{"system": "http://example.com", "value": "CMS1"}]
        }))
        .unwrap();

        let measure = resource.as_measure().unwrap();
        assert_eq!(measure.meta.identifier.len(), 1);
    }

    #[test]
    fn unknown_types_keep_metadata() {
        let resource = Resource::from_json(json!({
            "resourceType": "CodeSystem",
            "url": "http://example.com/CodeSystem/cs"
        }))
        .unwrap();

        assert_eq!(resource.resource_type(), "CodeSystem");
        assert_eq!(resource.url(), Some("http://example.com/CodeSystem/cs"));
    }

    #[test]
    fn missing_resource_type_is_rejected() {
        let err = Resource::from_json(json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, ResourceError::MissingResourceType));
    }

    #[test]
    fn malformed_library_reports_type() {
        let err = Resource::from_json(json!({
            "resourceType": "Library",
            "relatedArtifact": "not-a-list"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("Library"));
    }
}
