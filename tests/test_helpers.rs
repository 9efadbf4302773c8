// Test helpers for isolated testing
// Provides temporary workspaces and a mock GitHub/download server
#![allow(dead_code)]

use bunenv::cli::Cli;
use bunenv::config::Config;
use bunenv::platform::PlatformKey;
use bunenv::settings::Settings;
use serde_json::json;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

/// Isolated workspace using a temporary directory
/// Automatically cleaned up when dropped
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    /// Environment directory (not created)
    pub env_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        let env_dir = root.join("env");
        Self {
            temp_dir,
            root,
            env_dir,
        }
    }

    /// Write a file relative to the workspace root
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let file = self.root.join(name);
        std::fs::write(&file, content).unwrap();
        file
    }

    /// Settings for a Linux x86_64 host downloading from `server`
    pub fn settings(&self, cli: Cli, server: &MockServer) -> Settings {
        let cli = Cli {
            env_dir: Some(self.env_dir.clone()),
            mirror: Some(server.uri()),
            ..cli
        };
        let config = Config::default().merge_cli(&cli);
        Settings::new(config, &cli, linux_x64())
            .with_releases_url(format!("{}/repos/oven-sh/bun/releases", server.uri()))
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

pub fn linux_x64() -> PlatformKey {
    PlatformKey::from_host_names("Linux", "x86_64")
}

/// Zip shaped like a Bun release: `<folder>/bun`
pub fn bun_zip(folder: &str, script: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o755);
    writer.add_directory(format!("{folder}/"), options).unwrap();
    writer.start_file(format!("{folder}/bun"), options).unwrap();
    writer.write_all(script.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Serve a releases listing with the given tags, newest first
pub async fn mount_releases(server: &MockServer, tags: &[&str]) {
    let body = json!(
        tags.iter()
            .map(|tag| json!({ "tag_name": tag, "assets": [] }))
            .collect::<Vec<_>>()
    );
    Mock::given(method("GET"))
        .and(path("/repos/oven-sh/bun/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve a Linux x64 Bun zip for `version`
pub async fn mount_bun_zip(server: &MockServer, version: &str, script: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/bun-v{version}/bun-linux-x64.zip")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bun_zip("bun-linux-x64", script)))
        .mount(server)
        .await;
}
