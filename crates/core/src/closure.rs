//! Verifying that a `$package` Bundle carries every artifact its libraries
//! depend on.
//!
//! Only one level of `Library.relatedArtifact` edges is inspected, but the
//! edges come from every Library in the Bundle, so a server that inlined the
//! full transitive closure satisfies the check.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::resource::Resource;

/// Model-info dependency every CQL library declares; never packaged
pub const MODEL_INFO_REFERENCE: &str = "http://fhir.org/guides/cqf/common/Library/FHIR-ModelInfo|4.0.1";

/// How a dependency reference is classified as a Library or ValueSet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceCheck {
    /// The reference merely contains `Library` / `ValueSet`
    #[default]
    Substring,
    /// The resource-type path segment of the url is `Library` / `ValueSet`
    Structured,
}

impl ReferenceCheck {
    fn is_type(self, reference: &str, resource_type: &str) -> bool {
        match self {
            ReferenceCheck::Substring => reference.contains(resource_type),
            ReferenceCheck::Structured => {
                referenced_type(reference).is_some_and(|t| t == resource_type)
            }
        }
    }
}

/// Resource type of `Type/id` or `http://host/base/Type/id[|version]`
fn referenced_type(reference: &str) -> Option<&str> {
    let url = reference.split_once('|').map_or(reference, |(url, _)| url);
    let mut segments = url.rsplit('/');
    let id = segments.next()?;
    let resource_type = segments.next()?;
    let is_type_segment = resource_type.starts_with(|c: char| c.is_ascii_uppercase())
        && resource_type.chars().all(|c| c.is_ascii_alphabetic());
    (!id.is_empty() && is_type_segment).then_some(resource_type)
}

/// A canonical dependency, `url` with an optional version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactReference {
    pub url: String,
    pub version: Option<String>,
}

impl ArtifactReference {
    /// Split `url|version`; a bare url leaves the version unconstrained
    pub fn parse(reference: &str) -> Self {
        match reference.split_once('|') {
            Some((url, version)) => Self {
                url: url.to_string(),
                version: Some(version.to_string()),
            },
            None => Self {
                url: reference.to_string(),
                version: None,
            },
        }
    }

    pub fn is_satisfied_by(&self, resource: &Resource) -> bool {
        resource.url() == Some(self.url.as_str())
            && self
                .version
                .as_deref()
                .is_none_or(|version| resource.version() == Some(version))
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}|{}", self.url, version),
            None => f.write_str(&self.url),
        }
    }
}

/// Artifact-closure check configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClosureCheck {
    pub include_valuesets: bool,
    pub reference_check: ReferenceCheck,
}

impl ClosureCheck {
    pub fn new(include_valuesets: bool) -> Self {
        Self {
            include_valuesets,
            ..Default::default()
        }
    }

    pub fn with_reference_check(mut self, reference_check: ReferenceCheck) -> Self {
        self.reference_check = reference_check;
        self
    }

    /// Deduplicated dependency references declared by the Bundle's libraries
    pub fn dependencies(&self, bundle: &Bundle) -> BTreeSet<String> {
        bundle
            .resources()
            .filter_map(Resource::as_library)
            .flat_map(|library| library.related_artifact.iter())
            .filter(|ra| ra.is_depends_on())
            .filter_map(|ra| ra.resource.as_deref())
            .filter(|reference| self.selects(reference))
            .map(str::to_string)
            .collect()
    }

    fn selects(&self, reference: &str) -> bool {
        let library = self.reference_check.is_type(reference, "Library")
            && reference != MODEL_INFO_REFERENCE;
        let valueset =
            self.include_valuesets && self.reference_check.is_type(reference, "ValueSet");
        library || valueset
    }

    /// Dependencies with no satisfying entry in the Bundle, in sorted order
    pub fn missing(&self, bundle: &Bundle) -> Vec<ArtifactReference> {
        self.dependencies(bundle)
            .iter()
            .map(|reference| ArtifactReference::parse(reference))
            .filter(|dependency| !bundle.resources().any(|r| dependency.is_satisfied_by(r)))
            .collect()
    }

    pub fn is_satisfied(&self, bundle: &Bundle) -> bool {
        self.missing(bundle).is_empty()
    }
}

/// Whether every Library (and optionally ValueSet) dependency is in the Bundle
pub fn related_artifacts_present(bundle: &Bundle, include_valuesets: bool) -> bool {
    ClosureCheck::new(include_valuesets).is_satisfied(bundle)
}
