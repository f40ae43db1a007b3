//! Default configuration constants.

/// File name looked up in the working directory and the global config dir.
pub(super) const CONFIG_FILE_NAME: &str = "aide.toml";
/// Directory under the platform config root holding the global config.
pub(super) const CONFIG_DIR_NAME: &str = "aide";
/// Top-level table every CLI-visible key lives under.
pub const NAMESPACE: &str = "ai";

pub(super) const DEFAULT_PROVIDER: &str = "mock";
pub(super) const DEFAULT_MODEL: &str = "claude-3";
pub(super) const DEFAULT_TEMPERATURE: f64 = 0.7;
pub(super) const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Upper bound accepted for `ai.temperature`.
pub(super) const MAX_TEMPERATURE: f64 = 2.0;

pub(super) const ENV_PROVIDER: &str = "AIDE_PROVIDER";
pub(super) const ENV_MODEL: &str = "AIDE_MODEL";
