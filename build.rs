//! Injects `AIDE_BUILD_GIT_HASH` and `AIDE_BUILD_TIMESTAMP` for `build_info`.
//!
//! Either can be pinned from the environment for reproducible builds.

use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    let commit = pinned_or("AIDE_BUILD_GIT_HASH", || {
        stdout_of("git", &["rev-parse", "--short=12", "HEAD"])
    })
    .unwrap_or_else(|| "unknown".to_string());

    let built = pinned_or("AIDE_BUILD_TIMESTAMP", || {
        stdout_of("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"])
    })
    .unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        format!("unix:{secs}")
    });

    println!("cargo:rustc-env=AIDE_BUILD_GIT_HASH={commit}");
    println!("cargo:rustc-env=AIDE_BUILD_TIMESTAMP={built}");
}

fn pinned_or(var: &str, detect: impl FnOnce() -> Option<String>) -> Option<String> {
    println!("cargo:rerun-if-env-changed={var}");
    std::env::var(var).ok().or_else(detect)
}

/// Trimmed stdout of a successful command with non-empty output.
fn stdout_of(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string()).filter(|text| !text.is_empty())
}
