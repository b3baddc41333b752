//! FHIR Parameters bodies for operation requests

use serde::{Deserialize, Serialize};

/// FHIR Parameters resource (only the value types operations here accept)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub resource_type: String,

    #[serde(default)]
    pub parameter: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,
}

impl Parameters {
    pub fn new() -> Self {
        Self {
            resource_type: "Parameters".to_string(),
            parameter: Vec::new(),
        }
    }

    pub fn url(mut self, name: &str, value: &str) -> Self {
        self.parameter.push(Parameter {
            name: name.to_string(),
            value_url: Some(value.to_string()),
            value_string: None,
        });
        self
    }

    pub fn string(mut self, name: &str, value: &str) -> Self {
        self.parameter.push(Parameter {
            name: name.to_string(),
            value_url: None,
            value_string: Some(value.to_string()),
        });
        self
    }

    /// Append a string parameter only when a value is present
    pub fn optional_string(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.string(name, value),
            None => self,
        }
    }

    /// Value of the first parameter with the given name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameter
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value_url.as_deref().or(p.value_string.as_deref()))
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_fhir_value_types() {
        let params = Parameters::new()
            .url("url", "http://x/Measure/M")
            .string("identifier", "http://sys|1")
            .optional_string("version", None);

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["resourceType"], "Parameters");
        assert_eq!(json["parameter"].as_array().unwrap().len(), 2);
        assert_eq!(json["parameter"][0]["valueUrl"], "http://x/Measure/M");
        assert_eq!(json["parameter"][1]["valueString"], "http://sys|1");
        assert!(json["parameter"][1].get("valueUrl").is_none());
    }

    #[test]
    fn get_reads_either_value_type() {
        let params = Parameters::new()
            .url("url", "http://x")
            .optional_string("version", Some("1.0.0"));
        assert_eq!(params.get("url"), Some("http://x"));
        assert_eq!(params.get("version"), Some("1.0.0"));
        assert_eq!(params.get("identifier"), None);
    }
}
