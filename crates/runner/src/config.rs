//! Runner configuration

use std::num::NonZeroU32;
use std::time::Duration;

use measure_repo_core::{ArtifactType, IdentifierMatch, ReferenceCheck};

use crate::error::{MissingInput, RunnerError};

/// Identification of one artifact on the server under test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactInputs {
    pub id: Option<String>,
    pub url: Option<String>,
    pub identifier: Option<String>,
    pub version: Option<String>,
}

/// Which artifact element an input names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Id,
    Url,
    Identifier,
}

/// Inputs shared by every test case of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteInputs {
    pub measure: ArtifactInputs,
    pub library: ArtifactInputs,
}

impl SuiteInputs {
    pub fn artifact(&self, artifact: ArtifactType) -> &ArtifactInputs {
        match artifact {
            ArtifactType::Measure => &self.measure,
            ArtifactType::Library => &self.library,
        }
    }

    /// A required input, or the name of the missing one
    pub fn require(&self, artifact: ArtifactType, field: InputField) -> Result<&str, MissingInput> {
        let inputs = self.artifact(artifact);
        let value = match field {
            InputField::Id => &inputs.id,
            InputField::Url => &inputs.url,
            InputField::Identifier => &inputs.identifier,
        };
        value.as_deref().ok_or(MissingInput(input_name(artifact, field)))
    }

    pub fn version(&self, artifact: ArtifactType) -> Option<&str> {
        self.artifact(artifact).version.as_deref()
    }
}

fn input_name(artifact: ArtifactType, field: InputField) -> &'static str {
    match (artifact, field) {
        (ArtifactType::Measure, InputField::Id) => "measure_id",
        (ArtifactType::Measure, InputField::Url) => "measure_url",
        (ArtifactType::Measure, InputField::Identifier) => "measure_identifier",
        (ArtifactType::Library, InputField::Id) => "library_id",
        (ArtifactType::Library, InputField::Url) => "library_url",
        (ArtifactType::Library, InputField::Identifier) => "library_identifier",
    }
}

/// Knobs of the core checks that have a stricter alternative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    pub identifier_match: IdentifierMatch,
    pub reference_check: ReferenceCheck,
}

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub rate_limit_rps: NonZeroU32,
    pub request_timeout: Duration,
    pub checks: CheckOptions,
    /// Group ids to run; all groups when unset
    pub groups: Option<Vec<String>>,
    pub inputs: SuiteInputs,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("FHIR_BASE_URL").ok_or(RunnerError::MissingConfig("FHIR_BASE_URL"))?;

        let rate_limit_rps = get("RATE_LIMIT_RPS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<NonZeroU32>()
            .map_err(|e| invalid("RATE_LIMIT_RPS", e.to_string()))?;

        let request_timeout = get("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| invalid("REQUEST_TIMEOUT_SECS", e.to_string()))?;

        let identifier_match = match get("IDENTIFIER_MATCH").as_deref() {
            None | Some("loose") => IdentifierMatch::Loose,
            Some("joint") => IdentifierMatch::Joint,
            Some(other) => {
                return Err(invalid(
                    "IDENTIFIER_MATCH",
                    format!("expected 'loose' or 'joint', got '{}'", other),
                ));
            }
        };

        let reference_check = match get("REFERENCE_CHECK").as_deref() {
            None | Some("substring") => ReferenceCheck::Substring,
            Some("structured") => ReferenceCheck::Structured,
            Some(other) => {
                return Err(invalid(
                    "REFERENCE_CHECK",
                    format!("expected 'substring' or 'structured', got '{}'", other),
                ));
            }
        };

        let groups = get("SUITE_GROUPS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect()
        });

        let artifact = |prefix: &str| ArtifactInputs {
            id: get(&format!("{prefix}_ID")),
            url: get(&format!("{prefix}_URL")),
            identifier: get(&format!("{prefix}_IDENTIFIER")),
            version: get(&format!("{prefix}_VERSION")),
        };

        Ok(Self {
            base_url,
            rate_limit_rps,
            request_timeout,
            checks: CheckOptions {
                identifier_match,
                reference_check,
            },
            groups,
            inputs: SuiteInputs {
                measure: artifact("MEASURE"),
                library: artifact("LIBRARY"),
            },
        })
    }
}

fn invalid(name: &'static str, reason: String) -> RunnerError {
    RunnerError::InvalidConfig { name, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, RunnerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn base_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, RunnerError::MissingConfig("FHIR_BASE_URL")));
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("FHIR_BASE_URL", "http://localhost:3000/4_0_1")]).unwrap();
        assert_eq!(config.rate_limit_rps.get(), 10);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.checks, CheckOptions::default());
        assert!(config.groups.is_none());
        assert_eq!(config.inputs, SuiteInputs::default());
    }

    #[test]
    fn reads_inputs_and_options() {
        let config = load(&[
            ("FHIR_BASE_URL", "http://localhost"),
            ("MEASURE_ID", "m1"),
            ("MEASURE_IDENTIFIER", "http://sys|CMS1"),
            ("LIBRARY_URL", "http://x/Library/L"),
            ("LIBRARY_VERSION", ""),
            ("IDENTIFIER_MATCH", "joint"),
            ("REFERENCE_CHECK", "structured"),
            ("SUITE_GROUPS", "measure_package, library_package,"),
        ])
        .unwrap();

        assert_eq!(config.inputs.measure.id.as_deref(), Some("m1"));
        assert_eq!(
            config.inputs.require(ArtifactType::Measure, InputField::Identifier),
            Ok("http://sys|CMS1")
        );
        assert_eq!(config.inputs.version(ArtifactType::Library), None);
        assert_eq!(config.checks.identifier_match, IdentifierMatch::Joint);
        assert_eq!(config.checks.reference_check, ReferenceCheck::Structured);
        assert_eq!(
            config.groups,
            Some(vec!["measure_package".to_string(), "library_package".to_string()])
        );
    }

    #[test]
    fn missing_input_names_the_field() {
        let inputs = SuiteInputs::default();
        assert_eq!(
            inputs.require(ArtifactType::Library, InputField::Url),
            Err(MissingInput("library_url"))
        );
    }

    #[test]
    fn rejects_bad_values() {
        let err = load(&[("FHIR_BASE_URL", "http://x"), ("RATE_LIMIT_RPS", "0")]).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidConfig { name: "RATE_LIMIT_RPS", .. }));

        let err = load(&[("FHIR_BASE_URL", "http://x"), ("IDENTIFIER_MATCH", "fuzzy")]).unwrap_err();
        assert!(err.to_string().contains("IDENTIFIER_MATCH"));
    }
}
