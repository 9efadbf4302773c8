//! GitHub releases client for Bun.
//!
//! [`BunApi`] wraps a configured `reqwest` client. Every request carries the
//! `bunenv` user agent and, when a GitHub token is configured, an
//! `Authorization: token ...` header. Certificate verification can be turned
//! off with `--ignore_ssl_certs`; that is an explicit unsafe opt-in.
//!
//! # Examples
//!
//! ```no_run
//! use bunenv::api::BunApi;
//! use bunenv::cli::Cli;
//! use bunenv::config::Config;
//! use bunenv::platform::PlatformKey;
//! use bunenv::settings::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new(Config::default(), &Cli::default(), PlatformKey::detect());
//!     let api = BunApi::new(&settings)?;
//!
//!     if let Some(latest) = api.latest_version().await? {
//!         println!("Latest Bun: {}", latest);
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{BunenvError, Result};
use crate::settings::Settings;
use crate::version::TAG_PREFIX;
use anyhow::anyhow;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Bun releases listing on GitHub.
pub const RELEASES_URL: &str = "https://api.github.com/repos/oven-sh/bun/releases";

/// Project page advertised in the user agent.
pub const HOME_URL: &str = "https://github.com/JacobCoffee/bunenv/";

pub fn user_agent() -> String {
    format!("bunenv/{} ({})", env!("CARGO_PKG_VERSION"), HOME_URL)
}

/// Downloadable file attached to a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

/// GitHub release metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Version number without the `bun-v` tag prefix.
    pub fn version(&self) -> &str {
        self.tag_name.strip_prefix(TAG_PREFIX).unwrap_or(&self.tag_name)
    }
}

/// Bun release API client
#[derive(Clone)]
pub struct BunApi {
    client: reqwest::Client,
    releases_url: String,
}

impl BunApi {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &settings.github_token {
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|e| anyhow!("Invalid GitHub token: {e}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        if settings.ignore_ssl_certs {
            warn!("SSL certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .danger_accept_invalid_certs(settings.ignore_ssl_certs)
            .build()?;

        Ok(Self {
            client,
            releases_url: settings.releases_url.clone(),
        })
    }

    /// Fetch releases whose tag starts with `bun-v`, newest first.
    pub async fn fetch_releases(&self) -> Result<Vec<Release>> {
        debug!("Fetching releases from {}", self.releases_url);
        let releases: Vec<Release> = self
            .client
            .get(&self.releases_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(releases
            .into_iter()
            .filter(|release| release.tag_name.starts_with(TAG_PREFIX))
            .collect())
    }

    /// All available Bun versions, newest first.
    pub async fn versions(&self) -> Result<Vec<String>> {
        Ok(self
            .fetch_releases()
            .await?
            .iter()
            .map(|release| release.version().to_string())
            .collect())
    }

    /// Most recent Bun version (the first release listed).
    pub async fn latest_version(&self) -> Result<Option<String>> {
        Ok(self.versions().await?.into_iter().next())
    }

    /// GET `url` and read the whole body, in a single attempt.
    ///
    /// A body that stops early is reported as [`BunenvError::IncompleteRead`]
    /// so callers can retry it; HTTP status errors are returned as is.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let expected = response.content_length();

        let body = response.bytes().await.map_err(|e| {
            if e.is_body() || e.is_decode() {
                BunenvError::IncompleteRead {
                    url: url.to_string(),
                    detail: e.to_string(),
                }
            } else {
                BunenvError::Http(e)
            }
        })?;

        if let Some(expected) = expected {
            if (body.len() as u64) < expected {
                return Err(BunenvError::IncompleteRead {
                    url: url.to_string(),
                    detail: format!(
                        "{} bytes read, {} more expected",
                        body.len(),
                        expected - body.len() as u64
                    ),
                });
            }
        }

        Ok(body.to_vec())
    }
}
