//! Orchestrator integration tests.
//!
//! Tests the full flow: config -> component build -> start -> health check -> shutdown.

use std::time::Duration;

use mockito::{Matcher, Server};
use serial_test::serial;
use syslogidx_core::config::SyslogIdxConfig;
use syslogidx_daemon::orchestrator::Orchestrator;

/// Listener on an ephemeral port, retention with a first sweep far away.
fn listener_and_retention_config() -> SyslogIdxConfig {
    let toml_str = r#"
[general]
log_level = "info"

[syslog]
enabled = true
bind = "127.0.0.1:0"

[elasticsearch]
url = "http://127.0.0.1:9"

[retention]
enabled = true
retain_days = 3
interval_secs = 86400
max_jitter_secs = 7200
"#;
    SyslogIdxConfig::parse(toml_str).expect("failed to parse test config")
}

fn cloudtrail_only_config(aws_endpoint: &str) -> SyslogIdxConfig {
    let mut config = SyslogIdxConfig::default();
    config.syslog.enabled = false;
    config.retention.enabled = false;
    config.cloudtrail.enabled = true;
    config.cloudtrail.queue_name = "audit".to_owned();
    config.aws.region = "us-east-1".to_owned();
    config.aws.sqs_endpoint = aws_endpoint.to_owned();
    config.aws.s3_endpoint = aws_endpoint.to_owned();
    config
}

fn set_aws_credentials() {
    // SAFETY: env-mutating tests are serialized.
    unsafe {
        std::env::set_var("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE");
        std::env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
        std::env::remove_var("AWS_SESSION_TOKEN");
    }
}

fn clear_aws_credentials() {
    // SAFETY: env-mutating tests are serialized.
    unsafe {
        std::env::remove_var("AWS_ACCESS_KEY_ID");
        std::env::remove_var("AWS_SECRET_ACCESS_KEY");
        std::env::remove_var("AWS_SESSION_TOKEN");
    }
}

#[tokio::test]
async fn test_build_registers_enabled_components_in_order() {
    let orchestrator = Orchestrator::build_from_config(listener_and_retention_config())
        .await
        .expect("build should succeed");

    assert_eq!(
        orchestrator.plugin_names(),
        vec!["syslog-listener", "retention-sweep"]
    );
}

#[tokio::test]
async fn test_build_with_everything_disabled() {
    let mut config = SyslogIdxConfig::default();
    config.syslog.enabled = false;
    config.retention.enabled = false;

    let orchestrator = Orchestrator::build_from_config(config)
        .await
        .expect("an idle daemon is allowed");
    assert!(orchestrator.plugin_names().is_empty());
    assert!(orchestrator.health().await.status.is_healthy());
}

#[tokio::test]
async fn test_build_rejects_invalid_config() {
    let mut config = SyslogIdxConfig::default();
    config.elasticsearch.url = "127.0.0.1:9200".to_owned();

    let result = Orchestrator::build_from_config(config).await;
    assert!(result.is_err(), "url without scheme must be rejected");
}

#[tokio::test]
async fn test_start_health_and_shutdown() {
    let mut orchestrator = Orchestrator::build_from_config(listener_and_retention_config())
        .await
        .expect("build should succeed");

    orchestrator.start().await.expect("start should succeed");

    let health = orchestrator.health().await;
    assert!(health.status.is_healthy(), "status: {:?}", health.status);
    assert_eq!(health.modules.len(), 2);

    tokio::time::timeout(Duration::from_secs(5), orchestrator.shutdown())
        .await
        .expect("shutdown should not hang")
        .expect("shutdown should succeed");

    let health = orchestrator.health().await;
    assert!(health.status.is_unhealthy(), "stopped components are unhealthy");
}

#[tokio::test]
async fn test_start_fails_when_bind_address_is_taken() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = listener_and_retention_config();
    config.syslog.bind = occupied.local_addr().unwrap().to_string();

    let mut orchestrator = Orchestrator::build_from_config(config)
        .await
        .expect("build does not bind yet");

    assert!(orchestrator.start().await.is_err());
}

#[tokio::test]
async fn test_pid_file_lives_for_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("syslogidx.pid");
    let mut config = listener_and_retention_config();
    config.general.pid_file = pid_path.display().to_string();

    let mut orchestrator = Orchestrator::build_from_config(config).await.unwrap();
    orchestrator.start().await.unwrap();
    assert!(pid_path.exists(), "PID file should exist while running");

    orchestrator.shutdown().await.unwrap();
    assert!(!pid_path.exists(), "PID file should be removed on shutdown");
}

#[tokio::test]
async fn test_pid_file_removed_after_failed_start() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("syslogidx.pid");
    let mut config = listener_and_retention_config();
    config.syslog.bind = occupied.local_addr().unwrap().to_string();
    config.general.pid_file = pid_path.display().to_string();

    let mut orchestrator = Orchestrator::build_from_config(config).await.unwrap();
    assert!(orchestrator.start().await.is_err());
    assert!(!pid_path.exists());
}

#[tokio::test]
#[serial]
async fn test_cloudtrail_without_credentials_fails_build() {
    clear_aws_credentials();

    let result = Orchestrator::build_from_config(cloudtrail_only_config("http://127.0.0.1:9")).await;
    let err = result.err().expect("missing credentials must be fatal");
    assert!(
        err.to_string().contains("AWS_ACCESS_KEY_ID"),
        "error should name the missing variable, got: {err}"
    );
}

#[tokio::test]
#[serial]
async fn test_cloudtrail_unknown_queue_fails_start() {
    set_aws_credentials();
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .match_header("x-amz-target", "AmazonSQS.GetQueueUrl")
        .with_status(400)
        .with_body(r#"{"__type":"com.amazonaws.sqs#QueueDoesNotExist"}"#)
        .create_async()
        .await;

    let mut orchestrator = Orchestrator::build_from_config(cloudtrail_only_config(&server.url()))
        .await
        .expect("build should succeed with credentials present");
    assert!(orchestrator.start().await.is_err());

    clear_aws_credentials();
}

#[tokio::test]
#[serial]
async fn test_cloudtrail_resolves_queue_and_runs() {
    set_aws_credentials();
    let mut server = Server::new_async().await;
    let queue_url = server
        .mock("POST", "/")
        .match_header("x-amz-target", "AmazonSQS.GetQueueUrl")
        .match_body(Matcher::PartialJson(serde_json::json!({"QueueName": "audit"})))
        .with_status(200)
        .with_body(format!(r#"{{"QueueUrl":"{}/123/audit"}}"#, server.url()))
        .create_async()
        .await;
    let _receive = server
        .mock("POST", "/")
        .match_header("x-amz-target", "AmazonSQS.ReceiveMessage")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let mut orchestrator = Orchestrator::build_from_config(cloudtrail_only_config(&server.url()))
        .await
        .unwrap();
    assert_eq!(orchestrator.plugin_names(), vec!["cloudtrail-indexer"]);

    orchestrator.start().await.expect("queue should resolve");
    queue_url.assert_async().await;
    assert!(orchestrator.health().await.status.is_healthy());

    tokio::time::timeout(Duration::from_secs(5), orchestrator.shutdown())
        .await
        .expect("shutdown should interrupt the idle backoff")
        .unwrap();

    clear_aws_credentials();
}
