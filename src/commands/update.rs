use crate::error::Result;
use crate::install::install_packages;
use crate::settings::Settings;
use std::path::Path;
use tracing::debug;

/// Install the requirements file into an existing environment, leaving Bun
/// itself untouched.
pub fn update_packages(env_dir: &Path, settings: &Settings) -> Result<()> {
    debug!("Updating packages in {}", env_dir.display());
    install_packages(env_dir, settings)
}
