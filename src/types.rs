//! Typed operation requests and results exchanged with an [`Invoker`].
//!
//! Every supported operation has exactly one request variant and exactly one
//! result variant, so callers and invokers are checked exhaustively.
//!
//! [`Invoker`]: crate::provider::Invoker

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ProviderError;

// ---------------------------------------------------------------------------
// Operation names
// ---------------------------------------------------------------------------

/// The fixed set of operations an invoker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Generate,
    Review,
    Refactor,
    Docs,
    Test,
    Chat,
    Analyze,
    Optimize,
}

impl OperationKind {
    pub const ALL: [OperationKind; 8] = [
        Self::Generate,
        Self::Review,
        Self::Refactor,
        Self::Docs,
        Self::Test,
        Self::Chat,
        Self::Analyze,
        Self::Optimize,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Review => "review",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Test => "test",
            Self::Chat => "chat",
            Self::Analyze => "analyze",
            Self::Optimize => "optimize",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ProviderError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ProviderError::UnknownOperation(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// A file attached to a request, with its (possibly truncated) content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateParams {
    /// What to generate, e.g. `component`, `function`, `api`.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewParams {
    /// Files under review. Empty means the working tree as a whole.
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactorParams {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsParams {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default = "default_docs_format")]
    pub format: String,
}

fn default_docs_format() -> String {
    "markdown".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParams {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub framework: Option<String>,
}

/// One prior turn forwarded to the provider with a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParams {
    /// Empty means the invoker's configured model.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeParams {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
}

/// A request for one operation together with its typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "params", rename_all = "lowercase")]
pub enum OperationRequest {
    Generate(GenerateParams),
    Review(ReviewParams),
    Refactor(RefactorParams),
    Docs(DocsParams),
    Test(TestParams),
    Chat(ChatParams),
    Analyze(AnalyzeParams),
    Optimize(OptimizeParams),
}

impl OperationRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Generate(_) => OperationKind::Generate,
            Self::Review(_) => OperationKind::Review,
            Self::Refactor(_) => OperationKind::Refactor,
            Self::Docs(_) => OperationKind::Docs,
            Self::Test(_) => OperationKind::Test,
            Self::Chat(_) => OperationKind::Chat,
            Self::Analyze(_) => OperationKind::Analyze,
            Self::Optimize(_) => OperationKind::Optimize,
        }
    }

    /// Build a typed request from an operation name and a free-form
    /// parameter bag.
    ///
    /// Every parameter has a default, so any JSON object is accepted. Only a
    /// bag that is not an object, or a field of the wrong type, fails with
    /// [`ProviderError::InvalidParams`].
    pub fn from_parts(name: &str, params: serde_json::Value) -> Result<Self, ProviderError> {
        let kind: OperationKind = name.parse()?;
        let invalid = |e: serde_json::Error| ProviderError::InvalidParams {
            operation: kind.to_string(),
            message: e.to_string(),
        };
        let request = match kind {
            OperationKind::Generate => Self::Generate(serde_json::from_value(params).map_err(invalid)?),
            OperationKind::Review => Self::Review(serde_json::from_value(params).map_err(invalid)?),
            OperationKind::Refactor => Self::Refactor(serde_json::from_value(params).map_err(invalid)?),
            OperationKind::Docs => Self::Docs(serde_json::from_value(params).map_err(invalid)?),
            OperationKind::Test => Self::Test(serde_json::from_value(params).map_err(invalid)?),
            OperationKind::Chat => Self::Chat(serde_json::from_value(params).map_err(invalid)?),
            OperationKind::Analyze => Self::Analyze(serde_json::from_value(params).map_err(invalid)?),
            OperationKind::Optimize => Self::Optimize(serde_json::from_value(params).map_err(invalid)?),
        };
        Ok(request)
    }

    /// Parameters as JSON, attached to errors as context.
    pub fn params_json(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut("params").map(serde_json::Value::take))
            .unwrap_or(serde_json::Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIssue {
    pub severity: Severity,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub issues: Vec<ReviewIssue>,
    pub suggestions: Vec<String>,
    /// Overall quality score out of 100.
    pub score: u8,
}

/// A described set of edits, returned by refactor and optimize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePlan {
    pub description: String,
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: String,
    pub metrics: BTreeMap<String, f64>,
    pub findings: Vec<String>,
}

/// The result of one operation; the variant always matches the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "result", rename_all = "lowercase")]
pub enum OperationResult {
    Generate(String),
    Review(ReviewReport),
    Refactor(ChangePlan),
    Docs(String),
    Test(String),
    Chat(String),
    Analyze(AnalysisReport),
    Optimize(ChangePlan),
}

impl OperationResult {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Generate(_) => OperationKind::Generate,
            Self::Review(_) => OperationKind::Review,
            Self::Refactor(_) => OperationKind::Refactor,
            Self::Docs(_) => OperationKind::Docs,
            Self::Test(_) => OperationKind::Test,
            Self::Chat(_) => OperationKind::Chat,
            Self::Analyze(_) => OperationKind::Analyze,
            Self::Optimize(_) => OperationKind::Optimize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_names_parse_back() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "deploy".parse::<OperationKind>().unwrap_err();
        assert!(matches!(err, ProviderError::UnknownOperation(name) if name == "deploy"));
    }

    #[test]
    fn from_parts_builds_typed_request() {
        let request = OperationRequest::from_parts(
            "generate",
            json!({ "kind": "function", "prompt": "add two numbers" }),
        )
        .unwrap();
        assert_eq!(request.kind(), OperationKind::Generate);
        let OperationRequest::Generate(params) = request else {
            panic!("expected generate request");
        };
        assert_eq!(params.prompt, "add two numbers");
        assert_eq!(params.language, None);
    }

    #[test]
    fn from_parts_applies_docs_format_default() {
        let request = OperationRequest::from_parts("docs", json!({ "target": "src/lib.rs" })).unwrap();
        let OperationRequest::Docs(params) = request else {
            panic!("expected docs request");
        };
        assert_eq!(params.format, "markdown");
    }

    #[test]
    fn from_parts_accepts_empty_bag_for_every_operation() {
        for kind in OperationKind::ALL {
            let request = OperationRequest::from_parts(kind.as_str(), json!({})).unwrap();
            assert_eq!(request.kind(), kind);
        }
    }

    #[test]
    fn from_parts_fills_missing_fields_with_defaults() {
        let request = OperationRequest::from_parts("chat", json!({ "model": "claude-3" })).unwrap();
        let OperationRequest::Chat(params) = request else {
            panic!("expected chat request");
        };
        assert_eq!(params.model, "claude-3");
        assert_eq!(params.message, "");
        assert!(params.history.is_empty());
    }

    #[test]
    fn from_parts_rejects_wrong_value_types() {
        let err = OperationRequest::from_parts("chat", json!({ "message": 5 })).unwrap_err();
        match err {
            ProviderError::InvalidParams { operation, message } => {
                assert_eq!(operation, "chat");
                assert!(message.contains("invalid type"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_parts_rejects_non_object_bag() {
        let err = OperationRequest::from_parts("review", json!(42)).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidParams { ref operation, .. } if operation == "review"));
    }

    #[test]
    fn params_json_strips_the_operation_tag() {
        let request = OperationRequest::Analyze(AnalyzeParams {
            target: "src".into(),
            source: None,
            focus: Some("complexity".into()),
        });
        let params = request.params_json();
        assert_eq!(params["target"], "src");
        assert_eq!(params["focus"], "complexity");
        assert!(params.get("operation").is_none());
    }
}
