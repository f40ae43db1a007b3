//! Unified error types for the CLI.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading, mutating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("toml: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A config key was requested that does not exist under `ai.*`.
    #[error("config key `{0}` is not set")]
    MissingKey(String),
}

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

/// Errors raised by an operation invoker.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The operation name is not one of the supported operations.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    /// The parameter bag does not match the operation's schema.
    #[error("invalid parameters for `{operation}`: {message}")]
    InvalidParams { operation: String, message: String },
    /// The provider ran but could not produce a result.
    #[error("provider failed: {0}")]
    Failed(String),
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors from the on-disk chat session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid session id: {0}")]
    InvalidId(String),
    #[error("unsupported session file version {version} for {path}")]
    UnsupportedVersion { version: u32, path: String },
}

// ---------------------------------------------------------------------------
// OperationError
// ---------------------------------------------------------------------------

/// Stable per-operation error kinds surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    GenerateFailed,
    ReviewFailed,
    RefactorFailed,
    DocsFailed,
    TestFailed,
    ChatFailed,
    AnalyzeFailed,
    OptimizeFailed,
    ConfigSetFailed,
    ConfigGetFailed,
}

impl ErrorCode {
    /// Stable code string, e.g. `AI_GENERATE_FAILED`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateFailed => "AI_GENERATE_FAILED",
            Self::ReviewFailed => "AI_REVIEW_FAILED",
            Self::RefactorFailed => "AI_REFACTOR_FAILED",
            Self::DocsFailed => "AI_DOCS_FAILED",
            Self::TestFailed => "AI_TEST_FAILED",
            Self::ChatFailed => "AI_CHAT_FAILED",
            Self::AnalyzeFailed => "AI_ANALYZE_FAILED",
            Self::OptimizeFailed => "AI_OPTIMIZE_FAILED",
            Self::ConfigSetFailed => "AI_CONFIG_SET_FAILED",
            Self::ConfigGetFailed => "AI_CONFIG_GET_FAILED",
        }
    }

    /// Human summary prefixed to the wrapped cause.
    fn summary(self) -> &'static str {
        match self {
            Self::GenerateFailed => "failed to generate code",
            Self::ReviewFailed => "failed to review code",
            Self::RefactorFailed => "failed to refactor code",
            Self::DocsFailed => "failed to generate documentation",
            Self::TestFailed => "failed to generate tests",
            Self::ChatFailed => "chat request failed",
            Self::AnalyzeFailed => "failed to analyze code",
            Self::OptimizeFailed => "failed to optimize code",
            Self::ConfigSetFailed => "failed to set config value",
            Self::ConfigGetFailed => "failed to read config value",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An operation failure rewrapped with its stable code and input context.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct OperationError {
    pub code: ErrorCode,
    pub message: String,
    /// Input parameters the operation was invoked with.
    pub context: Value,
    /// Whether the operator may simply retry the command.
    pub recoverable: bool,
    #[source]
    source: Option<BoxError>,
}

impl OperationError {
    /// Wrap an underlying failure under `code`.
    pub fn wrap(code: ErrorCode, context: Value, err: impl Into<BoxError>) -> Self {
        let source = err.into();
        Self {
            code,
            message: format!("{}: {source}", code.summary()),
            context,
            recoverable: true,
            source: Some(source),
        }
    }

    /// Build a validation failure with no underlying cause.
    pub fn invalid(code: ErrorCode, context: Value, reason: impl Into<String>) -> Self {
        Self {
            code,
            message: format!("{}: {}", code.summary(), reason.into()),
            context,
            recoverable: true,
            source: None,
        }
    }
}
