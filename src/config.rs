//! Layered configuration.
//!
//! Values are merged from lowest to highest precedence:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. config files, applied in reverse order so the first file in the list wins
//! 3. `.bun-version` in the working directory (version only)
//! 4. explicit command line flags ([`Config::merge_cli`])
//!
//! Each step takes the previous `Config` by value and returns the merged one.
//! Config files are INI files; only their `[bunenv]` section is read.

use crate::cli::Cli;
use crate::error::{BunenvError, Result};
use crate::platform::Variant;
use crate::version::strip_tag_prefix;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Section name read from config files.
pub const SECTION: &str = "bunenv";

/// File in the working directory pinning the Bun version.
pub const VERSION_FILE: &str = ".bun-version";

/// Config files searched when `--config-file` is not given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["./tox.ini", "./setup.cfg", "~/.bunenvrc"];

/// Persistent settings that config files may provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bun: String,
    pub variant: Variant,
    pub github_token: Option<String>,
    pub prebuilt: bool,
    pub ignore_ssl_certs: bool,
    pub mirror: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bun: crate::version::LATEST.to_string(),
            variant: Variant::Default,
            github_token: None,
            prebuilt: true,
            ignore_ssl_certs: false,
            mirror: None,
        }
    }
}

impl Config {
    /// Load config files and `.bun-version` from `cwd`.
    ///
    /// Missing files and files without a `[bunenv]` section are skipped.
    pub fn load<P: AsRef<str>>(config_files: &[P], verbose: bool, cwd: &Path) -> Result<Self> {
        let mut config = Self::default();
        for file in config_files.iter().rev() {
            config = config.merge_file(&expand_user(file.as_ref()), verbose)?;
        }
        config.merge_version_file(&cwd.join(VERSION_FILE))
    }

    /// Apply the `[bunenv]` section of one INI file.
    pub fn merge_file(self, path: &Path, verbose: bool) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {} does not exist", path.display());
            return Ok(self);
        }

        let content = fs::read_to_string(path)?;
        let Some(section) = parse_ini_section(&content, SECTION) else {
            return Ok(self);
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut config = self;
        for (key, value) in &section {
            if key.starts_with('_') {
                continue;
            }
            let applied = config.set(key, value).map_err(|message| BunenvError::Config {
                file: path.to_path_buf(),
                message,
            })?;
            if applied && verbose {
                info!("CONFIG {}: {} = {}", file_name, key, value);
            }
        }
        Ok(config)
    }

    /// Apply a `.bun-version` file if it exists.
    pub fn merge_version_file(mut self, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(self);
        }
        let content = fs::read_to_string(path)?;
        let first_line = content.lines().next().unwrap_or("").trim();
        self.bun = strip_tag_prefix(first_line).to_string();
        Ok(self)
    }

    /// Apply explicitly given command line flags.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(bun) = &cli.bun {
            self.bun = bun.clone();
        }
        if let Some(variant) = cli.variant {
            self.variant = variant;
        }
        if cli.github_token.is_some() {
            self.github_token = cli.github_token.clone();
        }
        if cli.mirror.is_some() {
            self.mirror = cli.mirror.clone();
        }
        self.prebuilt |= cli.prebuilt;
        self.ignore_ssl_certs |= cli.ignore_ssl_certs;
        self
    }

    /// Set a recognised key. Returns `Ok(false)` for unknown keys.
    fn set(&mut self, key: &str, value: &str) -> std::result::Result<bool, String> {
        match key {
            "bun" => self.bun = value.to_string(),
            "variant" => self.variant = value.parse()?,
            "github_token" => self.github_token = non_empty(value),
            "prebuilt" => self.prebuilt = parse_bool(value)?,
            "ignore_ssl_certs" => self.ignore_ssl_certs = parse_bool(value)?,
            "mirror" => self.mirror = non_empty(value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Render the defaults as a `[bunenv]` section, keys sorted.
    pub fn dump(&self) -> String {
        let mut lines = vec![format!("    [{SECTION}]")];
        for (key, value) in self.entries() {
            lines.push(format!("    {key} = {value}"));
        }
        lines.join("\n")
    }

    fn entries(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("bun", self.bun.clone()),
            ("github_token", self.github_token.clone().unwrap_or_default()),
            ("ignore_ssl_certs", self.ignore_ssl_certs.to_string()),
            ("mirror", self.mirror.clone().unwrap_or_default()),
            ("prebuilt", self.prebuilt.to_string()),
            ("variant", self.variant.to_string()),
        ])
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Boolean words accepted by INI config files.
fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(format!("Not a boolean: {value}")),
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_user(path: &str) -> PathBuf {
    let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"));
    match (path.strip_prefix('~'), home) {
        (Some(""), Ok(home)) => PathBuf::from(home),
        (Some(rest), Ok(home)) if rest.starts_with(['/', '\\']) => {
            PathBuf::from(home).join(&rest[1..])
        }
        _ => PathBuf::from(path),
    }
}

/// Read the key/value pairs of one section of an INI document.
///
/// Keys are lower-cased, `=` and `:` both delimit, full-line `#` and `;`
/// comments are skipped and indented lines continue the previous value.
/// Returns `None` when the section is absent.
pub fn parse_ini_section(content: &str, section: &str) -> Option<Vec<(String, String)>> {
    let mut found = false;
    let mut in_section = false;
    let mut entries: Vec<(String, String)> = Vec::new();

    for raw in content.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_section = trimmed[1..trimmed.len() - 1].trim() == section;
            found |= in_section;
            continue;
        }

        if !in_section {
            continue;
        }

        if raw.starts_with([' ', '\t']) {
            if let Some((_, value)) = entries.last_mut() {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(trimmed);
                continue;
            }
        }

        let Some(pos) = trimmed.find(['=', ':']) else {
            // a bare key without a value
            upsert(&mut entries, trimmed.to_lowercase(), String::new());
            continue;
        };
        let key = trimmed[..pos].trim().to_lowercase();
        let value = trimmed[pos + 1..].trim().to_string();
        upsert(&mut entries, key, value);
    }

    found.then_some(entries)
}

fn upsert(entries: &mut Vec<(String, String)>, key: String, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}
