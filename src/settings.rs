//! Finalized, immutable settings for one run.

use crate::api::RELEASES_URL;
use crate::cli::Cli;
use crate::config::Config;
use crate::platform::{PlatformKey, Variant};
use std::path::PathBuf;

/// Everything the commands need, resolved once from config, flags and host.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Version token: a version number, `latest` or `system`
    pub bun: String,
    pub variant: Variant,
    pub github_token: Option<String>,
    pub mirror: Option<String>,
    pub prebuilt: bool,
    pub ignore_ssl_certs: bool,
    pub env_dir: Option<PathBuf>,
    pub requirements: Option<PathBuf>,
    pub prompt: Option<String>,
    pub list: bool,
    pub update: bool,
    pub python_virtualenv: bool,
    pub clean_src: bool,
    pub force: bool,
    pub verbose: bool,
    pub platform: PlatformKey,
    /// GitHub releases listing endpoint
    pub releases_url: String,
}

impl Settings {
    /// Combine the merged config with the remaining command line flags.
    pub fn new(config: Config, cli: &Cli, platform: PlatformKey) -> Self {
        Self {
            bun: config.bun,
            variant: config.variant,
            github_token: config.github_token,
            mirror: config.mirror,
            prebuilt: config.prebuilt,
            ignore_ssl_certs: config.ignore_ssl_certs,
            env_dir: cli.env_dir.clone(),
            requirements: cli
                .requirements
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
            prompt: cli.prompt.clone().filter(|prompt| !prompt.is_empty()),
            list: cli.list,
            update: cli.update,
            python_virtualenv: cli.python_virtualenv,
            clean_src: cli.clean_src,
            force: cli.force,
            verbose: cli.verbose,
            platform,
            releases_url: RELEASES_URL.to_string(),
        }
    }

    /// Same settings with the version token replaced.
    pub fn with_bun(self, bun: impl Into<String>) -> Self {
        Self {
            bun: bun.into(),
            ..self
        }
    }

    /// Same settings pointed at another releases endpoint.
    pub fn with_releases_url(self, url: impl Into<String>) -> Self {
        Self {
            releases_url: url.into(),
            ..self
        }
    }
}
