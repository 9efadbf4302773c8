//! Bun archive download with bounded retry.

use crate::api::BunApi;
use crate::error::{BunenvError, Result};
use crate::platform::{PlatformKey, Variant};
use crate::version::TAG_PREFIX;
use std::future::Future;
use tracing::warn;

/// Default download host for release artifacts.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com/oven-sh/bun/releases/download";

/// Attempts made when the connection drops mid-download.
pub const DOWNLOAD_ATTEMPTS: u32 = 3;

/// Download URL of the Bun zip for `version` on `platform`.
///
/// A mirror replaces the host part only; the tag and file name stay the same.
pub fn bun_bin_url(
    platform: &PlatformKey,
    version: &str,
    variant: Variant,
    mirror: Option<&str>,
) -> String {
    let base = mirror
        .filter(|mirror| !mirror.is_empty())
        .unwrap_or(DEFAULT_DOWNLOAD_BASE)
        .trim_end_matches('/');
    format!(
        "{}/{}{}/{}",
        base,
        TAG_PREFIX,
        version,
        platform.artifact_name(variant)
    )
}

/// Run `fetch` until it succeeds, retrying only incomplete reads.
///
/// Any other error is returned immediately. When all `attempts` end in an
/// incomplete read, the last one is returned unchanged.
pub async fn fetch_with_retry<F, Fut>(url: &str, attempts: u32, mut fetch: F) -> Result<Vec<u8>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    let mut remaining = attempts;
    while remaining > 0 {
        match fetch().await {
            Ok(body) => return Ok(body),
            Err(err @ BunenvError::IncompleteRead { .. }) => {
                warn!("{}", err);
                remaining -= 1;
                if remaining == 0 {
                    return Err(err);
                }
            }
            Err(err) => return Err(err),
        }
    }
    Err(BunenvError::DownloadFailed(url.to_string()))
}

/// Download `url` completely into memory.
pub async fn download_bun_file(api: &BunApi, url: &str) -> Result<Vec<u8>> {
    fetch_with_retry(url, DOWNLOAD_ATTEMPTS, || api.get_bytes(url)).await
}
