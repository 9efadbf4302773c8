// Integration tests for the create, list and update workflows
// All network traffic goes to a local mock server

mod test_helpers;

use bunenv::api::BunApi;
use bunenv::cli::Cli;
use bunenv::commands::create::create_environment;
use bunenv::commands::list::write_bun_versions;
use bunenv::commands::resolve_latest;
use bunenv::commands::update::update_packages;
use bunenv::error::BunenvError;
use bunenv::logging::{CaptureWriter, Verbosity};
use std::fs;
use test_helpers::{TestEnvironment, mount_bun_zip, mount_releases};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

const TAGS: [&str; 5] = [
    "bun-v1.0.0",
    "bun-v0.9.0",
    "bun-v0.8.5",
    "v0.1.0",
    "bun-v0.8.0-canary.1",
];

const FAKE_BUN: &str = "#!/bin/sh\necho \"$@\" >> \"$(dirname \"$0\")/../installed.txt\"\n";

#[tokio::test]
async fn test_versions_filtered_and_ordered() {
    let server = MockServer::start().await;
    mount_releases(&server, &TAGS).await;
    let env = TestEnvironment::new();
    let settings = env.settings(Cli::default(), &server);
    let api = BunApi::new(&settings).unwrap();

    let versions = api.versions().await.unwrap();
    assert_eq!(versions, vec!["1.0.0", "0.9.0", "0.8.5", "0.8.0-canary.1"]);
    assert_eq!(api.latest_version().await.unwrap().as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn test_resolve_latest() {
    let server = MockServer::start().await;
    mount_releases(&server, &TAGS).await;
    let env = TestEnvironment::new();
    let settings = env.settings(Cli::default(), &server);
    assert_eq!(settings.bun, "latest");

    let api = BunApi::new(&settings).unwrap();
    let resolved = resolve_latest(&api, settings).await.unwrap();
    assert_eq!(resolved.bun, "1.0.0");

    // explicit versions are left alone
    let pinned = resolve_latest(&api, resolved.with_bun("0.9.0")).await.unwrap();
    assert_eq!(pinned.bun, "0.9.0");
}

#[tokio::test]
async fn test_resolve_latest_without_releases() {
    let server = MockServer::start().await;
    mount_releases(&server, &[]).await;
    let env = TestEnvironment::new();
    let settings = env.settings(Cli::default(), &server);
    let api = BunApi::new(&settings).unwrap();

    let err = resolve_latest(&api, settings).await.unwrap_err();
    assert!(matches!(err, BunenvError::LatestVersionUnavailable));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_list_output() {
    let server = MockServer::start().await;
    mount_releases(&server, &TAGS).await;
    let env = TestEnvironment::new();
    let settings = env.settings(Cli::default(), &server);
    let api = BunApi::new(&settings).unwrap();

    let mut out = Vec::new();
    write_bun_versions(&api, &mut out).await.unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "1.0.0\t0.9.0\t0.8.5\t0.8.0-canary.1\n"
    );
}

#[tokio::test]
async fn test_list_output_ignores_quiet() {
    let server = MockServer::start().await;
    mount_releases(&server, &["bun-v1.0.0", "bun-v0.9.0"]).await;
    let env = TestEnvironment::new();
    let settings = env.settings(Cli::default(), &server);
    let api = BunApi::new(&settings).unwrap();

    let capture = CaptureWriter::new();
    let quiet = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(Verbosity::Quiet.directive()))
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(quiet);

    let mut out = Vec::new();
    write_bun_versions(&api, &mut out).await.unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1.0.0\t0.9.0\n");
    assert_eq!(capture.contents(), "");
}

#[tokio::test]
async fn test_create_environment() {
    let server = MockServer::start().await;
    mount_bun_zip(&server, "1.0.0", FAKE_BUN).await;
    let env = TestEnvironment::new();
    let cli = Cli {
        bun: Some("1.0.0".into()),
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);
    let api = BunApi::new(&settings).unwrap();

    let capture = CaptureWriter::new();
    let _guard = tracing::subscriber::set_default(capture.subscriber());
    create_environment(&api, &env.env_dir, &settings).await.unwrap();

    let bin = env.env_dir.join("bin");
    assert_eq!(fs::read_to_string(bin.join("bun")).unwrap(), FAKE_BUN);
    assert!(bin.join("activate").exists());
    assert!(bin.join("activate.fish").exists());
    assert!(bin.join("shim").exists());
    assert!(env.env_dir.join("src").join("bun-linux-x64").is_dir());

    let activate = fs::read_to_string(bin.join("activate")).unwrap();
    assert!(activate.contains("(env)"));

    assert!(
        capture
            .contents()
            .contains(" * Install prebuilt Bun (1.0.0) ... done.\n")
    );
}

#[tokio::test]
async fn test_create_environment_clean_src() {
    let server = MockServer::start().await;
    mount_bun_zip(&server, "1.0.0", FAKE_BUN).await;
    let env = TestEnvironment::new();
    let cli = Cli {
        bun: Some("1.0.0".into()),
        clean_src: true,
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);
    let api = BunApi::new(&settings).unwrap();

    create_environment(&api, &env.env_dir, &settings).await.unwrap();

    assert!(env.env_dir.join("bin").join("bun").exists());
    assert!(!env.env_dir.join("src").exists());
}

#[tokio::test]
async fn test_existing_environment_requires_force() {
    let server = MockServer::start().await;
    let env = TestEnvironment::new();
    fs::create_dir(&env.env_dir).unwrap();
    let cli = Cli {
        bun: Some("1.0.0".into()),
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);
    let api = BunApi::new(&settings).unwrap();

    let err = create_environment(&api, &env.env_dir, &settings)
        .await
        .unwrap_err();
    assert!(matches!(err, BunenvError::EnvironmentExists(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!env.env_dir.join("src").exists());
}

#[tokio::test]
async fn test_existing_environment_with_force() {
    let server = MockServer::start().await;
    mount_bun_zip(&server, "1.0.0", FAKE_BUN).await;
    let env = TestEnvironment::new();
    fs::create_dir(&env.env_dir).unwrap();
    let cli = Cli {
        bun: Some("1.0.0".into()),
        force: true,
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);
    let api = BunApi::new(&settings).unwrap();

    create_environment(&api, &env.env_dir, &settings).await.unwrap();
    assert!(env.env_dir.join("bin").join("bun").exists());
}

#[tokio::test]
async fn test_download_not_found() {
    let server = MockServer::start().await;
    let env = TestEnvironment::new();
    let cli = Cli {
        bun: Some("9.9.9".into()),
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);
    let api = BunApi::new(&settings).unwrap();

    let capture = CaptureWriter::new();
    let _guard = tracing::subscriber::set_default(capture.subscriber());
    let err = create_environment(&api, &env.env_dir, &settings)
        .await
        .unwrap_err();

    assert!(matches!(err, BunenvError::Http(_)));
    assert!(!env.env_dir.join("bin").join("bun").exists());
    let output = capture.contents();
    assert!(output.contains("Failed to download from"));
    assert!(output.contains("/bun-v9.9.9/bun-linux-x64.zip"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_create_with_requirements() {
    let server = MockServer::start().await;
    mount_bun_zip(&server, "1.0.0", FAKE_BUN).await;
    let env = TestEnvironment::new();
    let requirements = env.write("requirements.txt", "left-pad\n# comment\n\ntypescript@5.3.0\n");
    let cli = Cli {
        bun: Some("1.0.0".into()),
        requirements: Some(requirements),
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);
    let api = BunApi::new(&settings).unwrap();

    create_environment(&api, &env.env_dir, &settings).await.unwrap();

    let installed = fs::read_to_string(env.env_dir.join("installed.txt")).unwrap();
    assert_eq!(installed, "add -g left-pad\nadd -g typescript@5.3.0\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_update_installs_packages_only() {
    let server = MockServer::start().await;
    let env = TestEnvironment::new();
    let bin = env.env_dir.join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::write(bin.join("bun"), FAKE_BUN).unwrap();
    bunenv::fs_utils::make_executable(&bin.join("bun")).unwrap();

    let requirements = env.write("requirements.txt", "prettier\n");
    let cli = Cli {
        bun: Some("1.0.0".into()),
        update: true,
        requirements: Some(requirements),
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);

    update_packages(&env.env_dir, &settings).unwrap();

    let installed = fs::read_to_string(env.env_dir.join("installed.txt")).unwrap();
    assert_eq!(installed, "add -g prettier\n");
    assert!(!bin.join("activate").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_package_install() {
    let server = MockServer::start().await;
    mount_bun_zip(&server, "1.0.0", "#!/bin/sh\necho \"error: no such package\"\nexit 1\n").await;
    let env = TestEnvironment::new();
    let requirements = env.write("requirements.txt", "does-not-exist\n");
    let cli = Cli {
        bun: Some("1.0.0".into()),
        requirements: Some(requirements),
        ..Cli::default()
    };
    let settings = env.settings(cli, &server);
    let api = BunApi::new(&settings).unwrap();

    let err = create_environment(&api, &env.env_dir, &settings)
        .await
        .unwrap_err();
    match err {
        BunenvError::CommandFailed { command, code } => {
            assert_eq!(code, 1);
            assert!(command.ends_with("add -g does-not-exist"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
