//! Compound `system|value` identifier tokens and identifier matching.

use serde::{Deserialize, Serialize};

use crate::resource::{ArtifactMeta, Identifier};

/// Parsed identifier token; `None` components are unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierToken {
    pub system: Option<String>,
    pub value: Option<String>,
}

/// How system and value constraints are matched against a resource's identifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierMatch {
    /// Each constrained component may be satisfied by a different Identifier
    #[default]
    Loose,
    /// One Identifier must satisfy every constrained component
    Joint,
}

/// Split a `[system]|[value]` token. Any input is accepted.
///
/// - `value` → value only
/// - `|value` → value only
/// - `system|` → system only
/// - `system|value` → both, split on the first `|`
pub fn split_identifier(token: &str) -> IdentifierToken {
    let Some((left, right)) = token.split_once('|') else {
        return IdentifierToken {
            system: None,
            value: Some(token.to_string()),
        };
    };

    if left.is_empty() {
        IdentifierToken {
            system: None,
            value: Some(right.to_string()),
        }
    } else if token.ends_with('|') {
        // "a|b|" keeps its whole head as the system
        IdentifierToken {
            system: Some(token[..token.len() - 1].to_string()),
            value: None,
        }
    } else {
        IdentifierToken {
            system: Some(left.to_string()),
            value: Some(right.to_string()),
        }
    }
}

impl IdentifierToken {
    /// Test a list of identifiers against this token
    pub fn matches(&self, identifiers: &[Identifier], mode: IdentifierMatch) -> bool {
        match mode {
            IdentifierMatch::Loose => {
                !identifiers.is_empty()
                    && component_present(identifiers, self.value.as_deref(), |i| &i.value)
                    && component_present(identifiers, self.system.as_deref(), |i| &i.system)
            }
            IdentifierMatch::Joint => identifiers.iter().any(|i| {
                component_equals(&i.value, self.value.as_deref())
                    && component_equals(&i.system, self.system.as_deref())
            }),
        }
    }
}

fn component_present(
    identifiers: &[Identifier],
    expected: Option<&str>,
    field: impl Fn(&Identifier) -> &Option<String>,
) -> bool {
    match expected {
        None => true,
        Some(_) => identifiers.iter().any(|i| component_equals(field(i), expected)),
    }
}

fn component_equals(actual: &Option<String>, expected: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual.as_deref() == Some(expected),
    }
}

/// Whether the resource carries an identifier matching `token` (loose semantics)
pub fn resource_has_matching_identifier(resource: &ArtifactMeta, token: &str) -> bool {
    resource_has_matching_identifier_with(resource, token, IdentifierMatch::Loose)
}

pub fn resource_has_matching_identifier_with(
    resource: &ArtifactMeta,
    token: &str,
    mode: IdentifierMatch,
) -> bool {
    split_identifier(token).matches(&resource.identifier, mode)
}
