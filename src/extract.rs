//! Zip extraction and binary installation.
//!
//! Bun release zips hold a single top-level folder named after the artifact:
//! ```text
//! bun-linux-x64.zip
//!   bun-linux-x64/
//!     bun
//! ```
//! The archive is unpacked into the environment's `src/` directory, then the
//! `bun` executable is copied into `bin/` (`Scripts/` on Windows).

use crate::fs_utils::{make_executable, mkdir};
use crate::platform::PlatformKey;
use anyhow::Context;
use std::fs::{self, File, FileTimes};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Unpack an in-memory zip archive into `dest`.
pub fn extract_archive(bytes: &[u8], dest: &Path) -> crate::error::Result<()> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    archive.extract(dest)?;
    Ok(())
}

/// First `bun-*` directory directly inside `src_dir`, in file name order.
pub fn find_extracted_dir(src_dir: &Path) -> io::Result<PathBuf> {
    let found = WalkDir::new(src_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with("bun-")
        });

    match found {
        Some(entry) => Ok(entry.into_path()),
        None => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "Could not find extracted Bun directory in {}",
                src_dir.display()
            ),
        )),
    }
}

/// Copy the extracted bun executable into the environment's bin directory.
///
/// Returns the path of the installed binary.
pub fn copy_bun_from_prebuilt(
    env_dir: &Path,
    src_dir: &Path,
    platform: &PlatformKey,
) -> crate::error::Result<PathBuf> {
    info!(continued = true, ".");

    let dest_dir = env_dir.join(platform.bin_dir_name());
    mkdir(&dest_dir)?;

    let bun_folder = find_extracted_dir(src_dir)?;
    let src_binary = bun_folder.join(platform.bun_binary_name());
    let dest_binary = dest_dir.join(platform.bun_binary_name());

    if !src_binary.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Could not find Bun binary at {}", src_binary.display()),
        )
        .into());
    }

    fs::copy(&src_binary, &dest_binary).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            src_binary.display(),
            dest_binary.display()
        )
    })?;
    copy_times(&src_binary, &dest_binary)?;

    if !platform.is_windows() {
        make_executable(&dest_binary)?;
    }

    info!(continued = true, ".");
    Ok(dest_binary)
}

/// Give `dest` the access and modification times of `src`.
fn copy_times(src: &Path, dest: &Path) -> io::Result<()> {
    let meta = fs::metadata(src)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    File::options().write(true).open(dest)?.set_times(times)
}
