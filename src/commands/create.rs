use crate::activate::{install_activate, set_predeactivate_hook};
use crate::api::BunApi;
use crate::error::{BunenvError, Result};
use crate::fs_utils::mkdir;
use crate::install::{install_bun, install_packages};
use crate::settings::Settings;
use crate::version::{bun_version, is_system};
use std::fs;
use std::path::Path;
use tracing::info;

/// Create a new Bun environment in `env_dir`.
///
/// Steps, in order: stage `src/`, install Bun (or lay out the directories for
/// a system bun), write activation scripts, install requirements, hook into
/// the python virtualenv's deactivate, and finally drop `src/` if asked.
pub async fn create_environment(api: &BunApi, env_dir: &Path, settings: &Settings) -> Result<()> {
    if env_dir.exists() && !settings.python_virtualenv {
        info!(" * Environment already exists: {}", env_dir.display());
        if !settings.force {
            return Err(BunenvError::EnvironmentExists(env_dir.to_path_buf()));
        }
    }

    let src_dir = std::path::absolute(env_dir.join("src"))?;
    mkdir(&src_dir)?;

    if is_system(&settings.bun) {
        let version = bun_version(settings)?;
        info!(
            " * Using system Bun ({})",
            version
                .iter()
                .map(|part| part.to_string())
                .collect::<Vec<_>>()
                .join(".")
        );
        mkdir(&env_dir.join(settings.platform.bin_dir_name()))?;
        // bun keeps its global packages and cache under BUN_INSTALL
        mkdir(&env_dir.join("install").join("cache"))?;
    } else {
        install_bun(api, env_dir, &src_dir, settings).await?;
    }

    install_activate(env_dir, settings)?;

    if settings.requirements.is_some() {
        install_packages(env_dir, settings)?;
    }

    if settings.python_virtualenv {
        set_predeactivate_hook(env_dir, settings)?;
    }

    if settings.clean_src {
        fs::remove_dir_all(&src_dir)?;
    }

    Ok(())
}
