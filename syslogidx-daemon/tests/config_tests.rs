//! Layered configuration loading: file, environment, CLI flags.

use std::io::Write;

use clap::Parser;
use serial_test::serial;
use syslogidx_daemon::cli::DaemonCli;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn cli(args: &[&str]) -> DaemonCli {
    let mut argv = vec!["syslogidx-daemon"];
    argv.extend_from_slice(args);
    DaemonCli::try_parse_from(argv).unwrap()
}

fn clear_env() {
    // SAFETY: env-mutating tests are serialized.
    unsafe {
        std::env::remove_var("SYSLOGIDX_RETENTION_RETAIN_DAYS");
        std::env::remove_var("SYSLOGIDX_CLOUDTRAIL_QUEUE_NAME");
    }
}

#[tokio::test]
#[serial]
async fn test_file_then_env_then_cli() {
    clear_env();
    let file = write_config(
        r#"
[retention]
retain_days = 30

[cloudtrail]
queue_name = "from-file"
"#,
    );
    let path = file.path().to_str().unwrap();

    let config = cli(&["--config", path]).load_config().await.unwrap();
    assert_eq!(config.retention.retain_days, 30);
    assert_eq!(config.cloudtrail.queue_name, "from-file");

    // SAFETY: env-mutating tests are serialized.
    unsafe {
        std::env::set_var("SYSLOGIDX_RETENTION_RETAIN_DAYS", "20");
        std::env::set_var("SYSLOGIDX_CLOUDTRAIL_QUEUE_NAME", "from-env");
    }
    let config = cli(&["--config", path]).load_config().await.unwrap();
    assert_eq!(config.retention.retain_days, 20);
    assert_eq!(config.cloudtrail.queue_name, "from-env");

    let config = cli(&[
        "--config",
        path,
        "--retain-days",
        "10",
        "--cloudtrail-sqs-queue",
        "from-cli",
    ])
    .load_config()
    .await
    .unwrap();
    assert_eq!(config.retention.retain_days, 10);
    assert_eq!(config.cloudtrail.queue_name, "from-cli");

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_explicit_missing_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = cli(&["--config", missing.to_str().unwrap()])
        .load_config()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nope.toml"), "got: {err}");
}

#[tokio::test]
#[serial]
async fn test_invalid_cli_value_fails_validation() {
    clear_env();
    let file = write_config("");
    let err = cli(&[
        "--config",
        file.path().to_str().unwrap(),
        "--log-format",
        "xml",
    ])
    .load_config()
    .await
    .unwrap_err();
    assert!(err.to_string().contains("validation"), "got: {err}");
}

#[tokio::test]
#[serial]
async fn test_malformed_toml_is_an_error() {
    clear_env();
    let file = write_config("[retention\nretain_days = ");
    let result = cli(&["--config", file.path().to_str().unwrap()])
        .load_config()
        .await;
    assert!(result.is_err());
}
