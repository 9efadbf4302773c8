use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Create `path` and any missing parents, logging what happened.
pub fn mkdir(path: &Path) -> io::Result<()> {
    if path.exists() {
        debug!(" * Directory {} already exists", path.display());
        return Ok(());
    }
    debug!(continued = true, " * Creating: {} ... ", path.display());
    fs::create_dir_all(path)?;
    debug!("done.");
    Ok(())
}

/// Set mode 0755 on `path`. No-op on platforms without Unix permissions.
pub fn make_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
