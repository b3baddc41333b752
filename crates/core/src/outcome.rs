use serde::{Deserialize, Serialize};

/// Severity of the issue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// Type of issue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Invalid,
    Structure,
    Required,
    Value,
    Invariant,
    Security,
    Login,
    Expired,
    Forbidden,
    Suppressed,
    Processing,
    NotSupported,
    Duplicate,
    NotFound,
    TooLong,
    CodeInvalid,
    Extension,
    TooCostly,
    BusinessRule,
    Conflict,
    Incomplete,
    Transient,
    LockError,
    NoStore,
    Exception,
    Timeout,
    Throttled,
    Informational,
    /// Servers are not trusted to stay inside the value set
    #[serde(other)]
    Unknown,
}

/// A single issue within an OperationOutcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,

    #[serde(default = "unknown_issue")]
    pub code: IssueType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

fn unknown_issue() -> IssueType {
    IssueType::Unknown
}

/// FHIR OperationOutcome resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub issue: Vec<OperationOutcomeIssue>,
}

impl OperationOutcome {
    /// Create an OperationOutcome carrying a single error issue
    pub fn error(code: IssueType, diagnostics: &str) -> Self {
        Self {
            id: None,
            issue: vec![OperationOutcomeIssue {
                severity: IssueSeverity::Error,
                code,
                diagnostics: Some(diagnostics.to_string()),
            }],
        }
    }

    pub fn not_found(diagnostics: &str) -> Self {
        Self::error(IssueType::NotFound, diagnostics)
    }

    pub fn invalid(diagnostics: &str) -> Self {
        Self::error(IssueType::Invalid, diagnostics)
    }

    /// Severity of the first issue, which is what callers report on
    pub fn first_severity(&self) -> Option<IssueSeverity> {
        self.issue.first().map(|i| i.severity)
    }

    /// Serialize with the `resourceType` discriminator in place
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "resourceType".to_string(),
                serde_json::Value::String("OperationOutcome".to_string()),
            );
        }
        value
    }
}
