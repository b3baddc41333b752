//! Inspection of `$data-requirements` results.

use crate::resource::{CodeFilter, DataRequirement, Library};

/// Library type code of a `$data-requirements` result
pub const MODULE_DEFINITION: &str = "module-definition";

pub fn is_module_definition(library: &Library) -> bool {
    library.has_type_code(MODULE_DEFINITION)
}

/// Render a data requirement as `Type[.path](filter)`, where the filter is
/// `(system|code)` of the first code, `(valueSet)`, or `(no code filter)`.
///
/// Only the first code filter is described.
pub fn describe(requirement: &DataRequirement) -> String {
    let filter = requirement.code_filter.first();
    let path = filter
        .and_then(|f| f.path.as_deref())
        .map(|p| format!(".{p}"))
        .unwrap_or_default();

    format!("{}{}{}", requirement.data_type, path, filter_label(filter))
}

fn filter_label(filter: Option<&CodeFilter>) -> String {
    let Some(filter) = filter else {
        return "(no code filter)".to_string();
    };

    if let Some(code) = filter.code.first() {
        format!(
            "({}|{})",
            code.system.as_deref().unwrap_or_default(),
            code.code.as_deref().unwrap_or_default()
        )
    } else if let Some(value_set) = &filter.value_set {
        format!("({value_set})")
    } else {
        "(no code filter)".to_string()
    }
}

/// Comparison strings for every data requirement of a result Library
pub fn summarize(library: &Library) -> Vec<String> {
    library.data_requirement.iter().map(describe).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use serde_json::json;

    fn library(value: serde_json::Value) -> Library {
        Resource::from_json(value)
            .unwrap()
            .as_library()
            .cloned()
            .unwrap()
    }

    #[test]
    fn recognizes_module_definition() {
        let lib = library(json!({
            "resourceType": "Library",
            "type": {"coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/library-type",
                "code": "module-definition"
            }]}
        }));
        assert!(is_module_definition(&lib));

        let logic = library(json!({
            "resourceType": "Library",
            "type": {"coding": [{"code": "logic-library"}]}
        }));
        assert!(!is_module_definition(&logic));
        assert!(!is_module_definition(&Library::default()));
    }

    #[test]
    fn describes_each_filter_shape() {
        let lib = library(json!({
            "resourceType": "Library",
            "dataRequirement": [
                {"type": "Condition", "codeFilter": [{
                    "path": "code",
                    "code": [{"system": "http://snomed.info/sct", "code": "44054006"}]
                }]},
                {"type": "Encounter", "codeFilter": [{
                    "path": "type",
                    "valueSet": "http://cts.example.com/ValueSet/2.16.840.1"
                }]},
                {"type": "Patient"},
                {"type": "Observation", "codeFilter": [{}]}
            ]
        }));

        assert_eq!(
            summarize(&lib),
            vec![
                "Condition.code(http://snomed.info/sct|44054006)",
                "Encounter.type(http://cts.example.com/ValueSet/2.16.840.1)",
                "Patient(no code filter)",
                "Observation(no code filter)",
            ]
        );
    }
}
