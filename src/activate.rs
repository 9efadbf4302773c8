//! Activation scripts and shims written into an environment.
//!
//! Script templates are compiled into the binary and filled in by plain token
//! substitution:
//!
//! | Token                    | Replacement                          |
//! |--------------------------|--------------------------------------|
//! | `__BUN_VIRTUAL_PROMPT__` | prompt prefix, e.g. `(env)`          |
//! | `__BUN_VIRTUAL_ENV__`    | absolute environment path            |
//! | `__SHIM_BUN__`           | bun executable the shim execs        |
//! | `__BIN_NAME__`           | `bin` or `Scripts`                   |
//! | `__BUN_INSTALL__`        | `$BUN_VIRTUAL_ENV`                   |
//! | `__BUN_INSTALL_BIN__`    | `$BUN_VIRTUAL_ENV/<bin name>`        |

use crate::error::{BunenvError, Result};
use crate::fs_utils::{make_executable, mkdir};
use crate::settings::Settings;
use crate::version::is_system;
use anyhow::anyhow;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ACTIVATE_SH: &str = include_str!("templates/activate.sh");
pub const ACTIVATE_FISH: &str = include_str!("templates/activate.fish");
pub const SHIM: &str = include_str!("templates/shim");
pub const ACTIVATE_BAT: &str = include_str!("templates/activate.bat");
pub const DEACTIVATE_BAT: &str = include_str!("templates/deactivate.bat");
pub const ACTIVATE_PS1: &str = include_str!("templates/Activate.ps1");
pub const PREDEACTIVATE_SH: &str = include_str!("templates/predeactivate.sh");

const DISABLE_PROMPT_SH: &str = include_str!("templates/disable_prompt.sh");
const DISABLE_PROMPT_FISH: &str = include_str!("templates/disable_prompt.fish");
const ENABLE_PROMPT_SH: &str = include_str!("templates/enable_prompt.sh");
const ENABLE_PROMPT_FISH: &str = include_str!("templates/enable_prompt.fish");

/// What [`write_file`] did with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// File did not exist and was written (and made executable)
    Created,
    /// Existing file already contains the content
    AlreadyInPlace,
    /// Existing file differs and overwriting was not allowed
    Skipped,
    /// Content was appended to the existing file
    Appended,
    /// Existing file was replaced
    Overwritten,
}

/// Idempotently write `content` to `dest`.
///
/// An existing file that already contains `content` anywhere is left alone.
/// Otherwise it is skipped (`overwrite == false`), appended to (`append`) or
/// replaced. Only newly created files are made executable.
pub fn write_file(dest: &Path, content: &[u8], overwrite: bool, append: bool) -> io::Result<WriteOutcome> {
    if !dest.exists() {
        debug!(continued = true, " * Writing {} ... ", dest.display());
        fs::write(dest, content)?;
        make_executable(dest)?;
        debug!("done.");
        return Ok(WriteOutcome::Created);
    }

    let existing = fs::read(dest)?;
    if contains_bytes(&existing, content) {
        debug!(" * Content {} already in place", dest.display());
        return Ok(WriteOutcome::AlreadyInPlace);
    }

    if !overwrite {
        info!(
            " * File {} exists with different content;  not overwriting",
            dest.display()
        );
        return Ok(WriteOutcome::Skipped);
    }

    if append {
        info!(" * Appending data to {}", dest.display());
        OpenOptions::new().append(true).open(dest)?.write_all(content)?;
        return Ok(WriteOutcome::Appended);
    }

    info!(" * Overwriting {} with new content", dest.display());
    fs::write(dest, content)?;
    Ok(WriteOutcome::Overwritten)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Replace every `(token, value)` pair in `template`, in order.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |acc, (token, value)| acc.replace(token, value))
}

/// Prompt snippets wrapped around a script when joining a python virtualenv.
fn prompt_wrappers(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "activate" => Some((DISABLE_PROMPT_SH, ENABLE_PROMPT_SH)),
        "activate.fish" => Some((DISABLE_PROMPT_FISH, ENABLE_PROMPT_FISH)),
        _ => None,
    }
}

/// Drop `bin_dir` from a PATH value.
pub fn remove_env_bin_from_path(path: &OsStr, bin_dir: &Path) -> Result<OsString> {
    let kept: Vec<PathBuf> = env::split_paths(path).filter(|entry| entry != bin_dir).collect();
    env::join_paths(kept).map_err(|e| anyhow!("Invalid PATH: {e}").into())
}

/// Locate the system bun on `path`, ignoring the environment's own bin dir.
pub fn find_system_bun(path: &OsStr, bin_dir: &Path) -> Result<PathBuf> {
    let scrubbed = remove_env_bin_from_path(path, bin_dir)?;
    let cwd = env::current_dir()?;
    which::which_in("bun", Some(scrubbed), cwd)
        .map_err(|_| BunenvError::Other(anyhow!("Did not find bun system executable")))
}

/// Write the activation scripts (and shims) into the environment's bin dir.
pub fn install_activate(env_dir: &Path, settings: &Settings) -> Result<()> {
    let platform = &settings.platform;
    let env_dir = std::path::absolute(env_dir)?;
    let bin_name = platform.bin_dir_name();
    let bin_dir = env_dir.join(bin_name);
    mkdir(&bin_dir)?;

    let mut files: Vec<(&str, &str)> = if platform.is_windows() {
        vec![
            ("activate.bat", ACTIVATE_BAT),
            ("deactivate.bat", DEACTIVATE_BAT),
            ("Activate.ps1", ACTIVATE_PS1),
        ]
    } else {
        vec![
            ("activate", ACTIVATE_SH),
            ("activate.fish", ACTIVATE_FISH),
            ("shim", SHIM),
        ]
    };

    let system = is_system(&settings.bun);
    let shim_bun = if system {
        files.push(("bun", SHIM));
        let path = env::var_os("PATH").unwrap_or_default();
        find_system_bun(&path, &bin_dir)?
    } else {
        bin_dir.join(platform.bun_binary_name())
    };

    let prompt = match &settings.prompt {
        Some(prompt) => prompt.clone(),
        None => format!(
            "({})",
            env_dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default()
        ),
    };

    let env_path = env_dir.to_string_lossy().to_string();
    let shim_path = shim_bun.to_string_lossy().to_string();
    let install_bin = format!("$BUN_VIRTUAL_ENV/{bin_name}");
    let substitutions = [
        ("__BUN_INSTALL_BIN__", install_bin.as_str()),
        ("__BUN_INSTALL__", "$BUN_VIRTUAL_ENV"),
        ("__BUN_VIRTUAL_PROMPT__", prompt.as_str()),
        ("__BUN_VIRTUAL_ENV__", env_path.as_str()),
        ("__SHIM_BUN__", shim_path.as_str()),
        ("__BIN_NAME__", bin_name),
    ];

    for (name, template) in files {
        let mut content = render(template, &substitutions);
        let mut append = false;
        if settings.python_virtualenv {
            if let Some((disable, enable)) = prompt_wrappers(name) {
                content = format!("{disable}{content}{enable}");
                append = true;
            }
        }
        write_file(&bin_dir.join(name), content.as_bytes(), true, append)?;
    }
    Ok(())
}

/// Make a python virtualenv's deactivate also deactivate bunenv.
pub fn set_predeactivate_hook(env_dir: &Path, settings: &Settings) -> Result<()> {
    if settings.platform.is_windows() {
        return Ok(());
    }
    let hook = env_dir.join("bin").join("predeactivate");
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&hook)?
        .write_all(PREDEACTIVATE_SH.as_bytes())?;
    Ok(())
}
