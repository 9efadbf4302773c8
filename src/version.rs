//! Bun version token handling.
//!
//! Version tokens come from the command line, config files or `.bun-version`
//! and may look like `1.2.3`, `v1.2.3`, `bun-v1.2.3+build.7`, `latest` or
//! `system`. [`parse_version`] normalizes the numeric forms to at most three
//! integer components; `latest` is resolved against the releases API by the
//! create command, and `system` asks the installed `bun` for its version.

use crate::error::Result;
use crate::settings::Settings;
use anyhow::Context;
use std::process::Command;

/// Release tag prefix used by the Bun repository.
pub const TAG_PREFIX: &str = "bun-v";

/// Version token meaning "newest release".
pub const LATEST: &str = "latest";

/// Version token meaning "use the bun already on PATH".
pub const SYSTEM: &str = "system";

/// Strip a `bun-v` or `v` tag prefix.
///
/// The longer prefix is checked first so `bun-v1.0.0` does not end up as
/// `un-v1.0.0`-style garbage.
pub fn strip_tag_prefix(version: &str) -> &str {
    if let Some(rest) = version.strip_prefix(TAG_PREFIX) {
        return rest;
    }
    version.strip_prefix('v').unwrap_or(version)
}

/// Parse a version string into at most three integer components.
///
/// Returns an empty vector when any retained component is not a number.
///
/// ```
/// use bunenv::version::parse_version;
///
/// assert_eq!(parse_version("bun-v1.2.3+build.7"), vec![1, 2, 3]);
/// assert_eq!(parse_version("v0.9"), vec![0, 9]);
/// assert!(parse_version("invalid").is_empty());
/// ```
pub fn parse_version(version: &str) -> Vec<u64> {
    let stripped = strip_tag_prefix(version);

    let mut parsed = Vec::with_capacity(3);
    for (index, part) in stripped.split('.').take(3).enumerate() {
        // build metadata only ever trails the patch component
        let part = if index == 2 {
            part.split('+').next().unwrap_or(part)
        } else {
            part
        };
        match part.parse::<u64>() {
            Ok(n) => parsed.push(n),
            Err(_) => return Vec::new(),
        }
    }
    parsed
}

pub fn is_latest(token: &str) -> bool {
    token.is_empty() || token.eq_ignore_ascii_case(LATEST)
}

pub fn is_system(token: &str) -> bool {
    token.eq_ignore_ascii_case(SYSTEM)
}

/// Run `bun --version` from PATH and return its trimmed output.
pub fn system_bun_version_output() -> Result<String> {
    let output = Command::new("bun")
        .arg("--version")
        .output()
        .context("Failed to run bun --version")?;

    let stdout = String::from_utf8(output.stdout).context("Invalid UTF-8 in bun --version output")?;
    Ok(stdout.replace('\n', ""))
}

/// Numeric version requested by the user.
///
/// For `system` this asks the bun on PATH; every other token is parsed as is.
pub fn bun_version(settings: &Settings) -> Result<Vec<u64>> {
    if is_system(&settings.bun) {
        return Ok(parse_version(&system_bun_version_output()?));
    }
    Ok(parse_version(&settings.bun))
}
