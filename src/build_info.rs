//! Compile-time build metadata exposed to the CLI.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("AIDE_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("AIDE_BUILD_TIMESTAMP");

/// Help trailer that surfaces build metadata in `aide --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("AIDE_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("AIDE_BUILD_TIMESTAMP")
);

/// Version string used by `aide --version`.
pub const CLI_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("AIDE_BUILD_GIT_HASH"),
    ", built ",
    env!("AIDE_BUILD_TIMESTAMP"),
    ")"
);

/// Short banner line shown when an interactive chat starts.
pub fn banner_line() -> String {
    format!("aide v{VERSION} ({GIT_COMMIT})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_line_contains_version_and_commit() {
        let text = banner_line();
        assert!(text.starts_with("aide v"));
        assert!(text.contains(VERSION));
        assert!(text.contains(GIT_COMMIT));
    }

    #[test]
    fn cli_version_mentions_build_time() {
        assert!(CLI_VERSION.starts_with(VERSION));
        assert!(CLI_VERSION.contains(BUILD_TIMESTAMP));
    }
}
