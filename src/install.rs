//! Bun installation into an environment, and global package installs.

use crate::api::BunApi;
use crate::download::{bun_bin_url, download_bun_file};
use crate::error::{BunenvError, Result};
use crate::extract::{copy_bun_from_prebuilt, extract_archive};
use crate::process::run_command;
use crate::settings::Settings;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Download the Bun zip at `url` and unpack it into `src_dir`.
pub async fn download_bun_bin(api: &BunApi, url: &str, src_dir: &Path) -> Result<()> {
    let bytes = download_bun_file(api, url).await?;
    extract_archive(&bytes, src_dir)
}

/// Install prebuilt Bun into `env_dir`, staging the download in `src_dir`.
///
/// Progress is printed on a single line; on failure the line is terminated
/// before the error propagates.
pub async fn install_bun(
    api: &BunApi,
    env_dir: &Path,
    src_dir: &Path,
    settings: &Settings,
) -> Result<()> {
    let result = install_bun_wrapped(api, env_dir, src_dir, settings).await;
    if result.is_err() {
        info!("");
    }
    result
}

async fn install_bun_wrapped(
    api: &BunApi,
    env_dir: &Path,
    src_dir: &Path,
    settings: &Settings,
) -> Result<()> {
    let env_dir = std::path::absolute(env_dir)?;

    if !settings.prebuilt {
        warn!("Bun is only distributed as prebuilt binaries; installing the prebuilt package");
    }

    info!(continued = true, " * Install prebuilt Bun ({}) ", settings.bun);

    let url = bun_bin_url(
        &settings.platform,
        &settings.bun,
        settings.variant,
        settings.mirror.as_deref(),
    );

    if let Err(err) = download_bun_bin(api, &url, src_dir).await {
        if matches!(err, BunenvError::Http(_)) {
            error!("Failed to download from {}: {}", url, err);
        }
        return Err(err);
    }

    info!(continued = true, ".");

    copy_bun_from_prebuilt(&env_dir, src_dir, &settings.platform)?;

    info!(" done.");
    Ok(())
}

/// Install every package listed in the requirements file with `bun add -g`.
///
/// Blank lines and `#` comments are skipped. Does nothing without a
/// requirements file.
pub fn install_packages(env_dir: &Path, settings: &Settings) -> Result<()> {
    let Some(requirements) = &settings.requirements else {
        return Ok(());
    };

    info!(continued = true, " * Install packages ... ");

    let bun_bin = env_dir
        .join(settings.platform.bin_dir_name())
        .join(settings.platform.bun_binary_name());

    let content = fs::read_to_string(requirements).with_context(|| {
        format!(
            "Failed to read requirements file: {}",
            requirements.display()
        )
    })?;

    for package in requirement_lines(&content) {
        let cmd = vec![
            bun_bin.to_string_lossy().to_string(),
            "add".to_string(),
            "-g".to_string(),
            package.to_string(),
        ];
        run_command(&cmd, settings.verbose)?;
    }

    info!("done.");
    Ok(())
}

/// Package specs in a requirements file, in order.
pub fn requirement_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
