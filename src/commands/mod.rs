//! Command implementations for the bunenv CLI
//!
//! - **create**: Create a new environment (default)
//! - **list**: List available Bun versions (`--list`)
//! - **update**: Install requirements into an existing environment (`--update`)

pub mod create;
pub mod list;
pub mod update;

use crate::api::BunApi;
use crate::error::{BunenvError, Result};
use crate::settings::Settings;
use crate::version::{is_latest, is_system};
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Run the command selected by `settings`.
pub async fn run(settings: Settings) -> Result<()> {
    if is_system(&settings.bun) && settings.platform.is_windows() {
        return Err(BunenvError::SystemBunUnsupported);
    }

    let api = BunApi::new(&settings)?;
    let settings = resolve_latest(&api, settings).await?;

    if settings.list {
        list::print_bun_versions(&api).await
    } else if settings.update {
        let env_dir = get_env_dir(&settings)?;
        update::update_packages(&env_dir, &settings)
    } else {
        let env_dir = get_env_dir(&settings)?;
        create::create_environment(&api, &env_dir, &settings).await
    }
}

/// Replace a `latest` (or empty) version token with the newest release.
pub async fn resolve_latest(api: &BunApi, settings: Settings) -> Result<Settings> {
    if !is_latest(&settings.bun) {
        return Ok(settings);
    }
    let latest = api
        .latest_version()
        .await?
        .ok_or(BunenvError::LatestVersionUnavailable)?;
    debug!("Resolved latest Bun version: {}", latest);
    Ok(settings.with_bun(latest))
}

/// Environment directory to work on.
///
/// With `--python-virtualenv` this is the active python virtualenv (or conda
/// environment); otherwise the DEST_DIR argument.
pub fn get_env_dir(settings: &Settings) -> Result<PathBuf> {
    if settings.python_virtualenv {
        return virtualenv_prefix(|key| env::var_os(key).map(PathBuf::from))
            .ok_or(BunenvError::NoVirtualenv);
    }
    settings
        .env_dir
        .clone()
        .ok_or_else(|| anyhow::anyhow!("You must provide a DEST_DIR or use current python virtualenv").into())
}

/// Prefix of the active python virtualenv, from `VIRTUAL_ENV` then `CONDA_PREFIX`.
pub fn virtualenv_prefix(lookup: impl Fn(&str) -> Option<PathBuf>) -> Option<PathBuf> {
    ["VIRTUAL_ENV", "CONDA_PREFIX"]
        .into_iter()
        .filter_map(lookup)
        .find(|prefix| !prefix.as_os_str().is_empty())
}
