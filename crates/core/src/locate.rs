//! Locating the root Measure or Library of a `$package` Bundle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::identifier::{IdentifierMatch, split_identifier};
use crate::resource::{ArtifactMeta, Library, Measure, Resource};

/// Knowledge artifact types served by a measure repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
    Measure,
    Library,
}

impl ArtifactType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactType::Measure => "Measure",
            ArtifactType::Library => "Library",
        }
    }

    fn meta_of(self, resource: &Resource) -> Option<&ArtifactMeta> {
        match (self, resource) {
            (ArtifactType::Measure, Resource::Measure(m)) => Some(&m.meta),
            (ArtifactType::Library, Resource::Library(l)) => Some(&l.meta),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which element of the artifact a lookup value is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Id,
    Url,
    Identifier,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Id => "id",
            MatchKind::Url => "url",
            MatchKind::Identifier => "identifier",
        }
    }

    fn matches(self, meta: &ArtifactMeta, expected: &str, mode: IdentifierMatch) -> bool {
        match self {
            MatchKind::Id => meta.id.as_deref() == Some(expected),
            MatchKind::Url => meta.url.as_deref() == Some(expected),
            MatchKind::Identifier => split_identifier(expected).matches(&meta.identifier, mode),
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First entry of the expected type matching `expected` by `kind`.
///
/// Zero matches yield `None`; multiple matches resolve to the first.
pub fn find_entry<'a>(
    bundle: &'a Bundle,
    artifact: ArtifactType,
    expected: &str,
    kind: MatchKind,
) -> Option<&'a Resource> {
    find_entry_with(bundle, artifact, expected, kind, IdentifierMatch::Loose)
}

pub fn find_entry_with<'a>(
    bundle: &'a Bundle,
    artifact: ArtifactType,
    expected: &str,
    kind: MatchKind,
    mode: IdentifierMatch,
) -> Option<&'a Resource> {
    bundle.resources().find(|resource| {
        artifact
            .meta_of(resource)
            .is_some_and(|meta| kind.matches(meta, expected, mode))
    })
}

pub fn find_measure<'a>(bundle: &'a Bundle, expected: &str, kind: MatchKind) -> Option<&'a Measure> {
    find_entry(bundle, ArtifactType::Measure, expected, kind).and_then(Resource::as_measure)
}

pub fn find_library<'a>(bundle: &'a Bundle, expected: &str, kind: MatchKind) -> Option<&'a Library> {
    find_entry(bundle, ArtifactType::Library, expected, kind).and_then(Resource::as_library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle(entries: serde_json::Value) -> Bundle {
        serde_json::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": entries
        }))
        .unwrap()
    }

    #[test]
    fn finds_measure_by_id() {
        let b = bundle(json!([
            {"resource": {"resourceType": "Measure", "id": "A"}},
            {"resource": {"resourceType": "Measure", "id": "B"}}
        ]));

        let found = find_measure(&b, "B", MatchKind::Id).unwrap();
        assert_eq!(found.meta.id.as_deref(), Some("B"));
        assert!(find_measure(&b, "C", MatchKind::Id).is_none());
    }

    #[test]
    fn filters_by_resource_type() {
        let b = bundle(json!([
            {"resource": {"resourceType": "Library", "id": "A", "url": "http://x/Library/A"}},
            {"resource": {"resourceType": "Measure", "id": "M", "url": "http://x/Measure/M"}}
        ]));

        assert!(find_measure(&b, "A", MatchKind::Id).is_none());
        assert!(find_library(&b, "http://x/Library/A", MatchKind::Url).is_some());
        assert!(find_library(&b, "http://x/Measure/M", MatchKind::Url).is_none());
    }

    #[test]
    fn ambiguity_resolves_to_first_match() {
        let b = bundle(json!([
            {"resource": {"resourceType": "Library", "id": "first", "url": "http://x/Library/L"}},
            {"resource": {"resourceType": "Library", "id": "second", "url": "http://x/Library/L"}}
        ]));

        let found = find_library(&b, "http://x/Library/L", MatchKind::Url).unwrap();
        assert_eq!(found.meta.id.as_deref(), Some("first"));
    }

    #[test]
    fn identifier_lookup_uses_token_grammar() {
        let b = bundle(json!([
            {"resource": {
                "resourceType": "Measure",
                "id": "M",
                "identifier": [{"system": "http://sys", "value": "CMS130"}]
            }}
        ]));

        assert!(find_measure(&b, "http://sys|CMS130", MatchKind::Identifier).is_some());
        assert!(find_measure(&b, "CMS130", MatchKind::Identifier).is_some());
        assert!(find_measure(&b, "http://other|CMS130", MatchKind::Identifier).is_none());
    }

    #[test]
    fn joint_mode_is_threaded_through() {
        let b = bundle(json!([
            {"resource": {
                "resourceType": "Library",
                "identifier": [
                    {"system": "http://a", "value": "1"},
                    {"system": "http://b", "value": "2"}
                ]
            }}
        ]));

        let loose = find_entry_with(
            &b,
            ArtifactType::Library,
            "http://a|2",
            MatchKind::Identifier,
            IdentifierMatch::Loose,
        );
        let joint = find_entry_with(
            &b,
            ArtifactType::Library,
            "http://a|2",
            MatchKind::Identifier,
            IdentifierMatch::Joint,
        );
        assert!(loose.is_some());
        assert!(joint.is_none());
    }
}
