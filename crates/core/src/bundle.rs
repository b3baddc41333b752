use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// FHIR Bundle types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Searchset,
    History,
    Collection,
    Document,
    Message,
    Transaction,
    TransactionResponse,
    Batch,
    BatchResponse,
}

/// FHIR Bundle resource (simplified for `$package` responses)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: Option<BundleType>,

    pub total: Option<u32>,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

/// Bundle entry wrapping one resource
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: Option<String>,
    pub resource: Option<Resource>,
}

impl Bundle {
    /// Resources of every entry, skipping entries without one
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_mixed_entries() {
        let bundle: Bundle = serde_json::from_value(json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {"resourceType": "Measure", "id": "m"}},
                {"fullUrl": "urn:uuid:1"},
                {"resource": {"resourceType": "Library", "id": "l"}}
            ]
        }))
        .unwrap();

        assert_eq!(bundle.bundle_type, Some(BundleType::Collection));
        let types: Vec<&str> = bundle.resources().map(Resource::resource_type).collect();
        assert_eq!(types, vec!["Measure", "Library"]);
    }

    #[test]
    fn transaction_response_type_is_kebab_case() {
        let bundle: Bundle = serde_json::from_value(json!({
            "resourceType": "Bundle",
            "type": "transaction-response"
        }))
        .unwrap();
        assert_eq!(bundle.bundle_type, Some(BundleType::TransactionResponse));
        assert!(bundle.entry.is_empty());
    }
}
