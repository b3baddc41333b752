use serde::{Deserialize, Serialize};

/// FHIR CapabilityStatement resource (simplified)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    pub resource_type: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub fhir_version: Option<String>,

    #[serde(default)]
    pub rest: Vec<CapabilityRest>,
}

impl CapabilityStatement {
    /// Server-mode resource declaration for the given type, if any
    pub fn server_resource(&self, resource_type: &str) -> Option<&CapabilityResource> {
        self.rest
            .iter()
            .filter(|r| r.mode == "server")
            .flat_map(|r| r.resource.iter())
            .find(|r| r.resource_type == resource_type)
    }

    pub fn supports_resource(&self, resource_type: &str) -> bool {
        self.server_resource(resource_type).is_some()
    }
}

/// REST capability declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityRest {
    pub mode: String,

    #[serde(default)]
    pub resource: Vec<CapabilityResource>,
}

/// Resource capability declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityResource {
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default)]
    pub interaction: Vec<CapabilityInteraction>,

    #[serde(default)]
    pub operation: Vec<CapabilityOperation>,
}

impl CapabilityResource {
    pub fn supports_interaction(&self, code: &str) -> bool {
        self.interaction.iter().any(|i| i.code == code)
    }

    /// Operation names are declared without the leading `$`
    pub fn supports_operation(&self, name: &str) -> bool {
        let name = name.trim_start_matches('$');
        self.operation.iter().any(|o| o.name == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityInteraction {
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityOperation {
    pub name: String,

    #[serde(default)]
    pub definition: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn statement() -> CapabilityStatement {
        serde_json::from_value(json!({
            "resourceType": "CapabilityStatement",
            "status": "active",
            "kind": "instance",
            "fhirVersion": "4.0.1",
            "rest": [{
                "mode": "server",
                "resource": [{
                    "type": "Measure",
                    "interaction": [{"code": "read"}, {"code": "search-type"}],
                    "operation": [{"name": "package"}, {"name": "data-requirements"}]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn finds_declared_resources() {
        let cs = statement();
        assert!(cs.supports_resource("Measure"));
        assert!(!cs.supports_resource("Library"));
    }

    #[test]
    fn operations_match_with_or_without_dollar() {
        let cs = statement();
        let measure = cs.server_resource("Measure").unwrap();
        assert!(measure.supports_operation("$package"));
        assert!(measure.supports_operation("data-requirements"));
        assert!(measure.supports_interaction("read"));
        assert!(!measure.supports_interaction("delete"));
    }
}
