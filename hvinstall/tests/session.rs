use std::sync::Arc;
use std::time::Duration;

use hvinstall::config::WebhookDefinition;
use hvinstall::executor::{Executor, ExecutorOptions};
use hvinstall::{InstallEvent, InstallSession, InstallerError, ResolvedConfig};
use hvinstall_test_utils::{
    RecordingServer, RecordingSink, StaticHost, valid_create_config, valid_join_config,
    write_script,
};

fn session(dir: &std::path::Path, script: &str) -> InstallSession {
    InstallSession::new(
        Arc::new(StaticHost::default()),
        Executor::new(ExecutorOptions {
            install_binary: write_script(dir, "install", script),
            temp_dir: dir.to_path_buf(),
        }),
        Duration::from_secs(5),
    )
}

fn with_hooks(mut cfg: ResolvedConfig, server: &RecordingServer) -> ResolvedConfig {
    cfg.os.install.webhooks = vec![
        WebhookDefinition {
            event: "STARTED".into(),
            method: "POST".into(),
            url: server.url("/started/{{.Hostname}}"),
            payload: "{{.Mode}}".into(),
            ..Default::default()
        },
        WebhookDefinition {
            event: "COMPLETED".into(),
            method: "POST".into(),
            url: server.url("/completed/{{.Hostname}}"),
            ..Default::default()
        },
    ];
    cfg
}

#[tokio::test]
async fn test_session_fires_started_then_completed() {
    let server = RecordingServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path(), "echo installing");

    let sink = Arc::new(RecordingSink::default());
    let outcome = session
        .run(&with_hooks(valid_create_config(), &server), sink.clone())
        .await
        .unwrap();

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/started/node1", "/completed/node1"]);
    assert_eq!(server.requests()[0].body, "create");
    assert!(outcome.webhook_failures.is_empty());
    assert!(outcome.config_path.exists());
    assert_eq!(sink.stdout(), vec!["installing"]);
}

#[tokio::test]
async fn test_invalid_config_runs_nothing() {
    let server = RecordingServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path(), "touch \"$(dirname \"$0\")/ran\"");

    let mut cfg = with_hooks(valid_join_config(), &server);
    cfg.token.clear();

    let err = session
        .run(&cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, InstallerError::Validation(_)));
    assert!(server.requests().is_empty());
    assert!(!dir.path().join("ran").exists());
}

#[tokio::test]
async fn test_bad_webhook_definition_aborts_before_install() {
    let server = RecordingServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path(), "touch \"$(dirname \"$0\")/ran\"");

    let mut cfg = with_hooks(valid_create_config(), &server);
    cfg.os.install.webhooks[1].method = "PUNCH".into();

    let err = session
        .run(&cfg, Arc::new(RecordingSink::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, InstallerError::WebhookConfig(_)));
    assert!(server.requests().is_empty());
    assert!(!dir.path().join("ran").exists());
}

#[tokio::test]
async fn test_failed_install_skips_completed() {
    let server = RecordingServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path(), "exit 1");

    let err = session
        .run(
            &with_hooks(valid_create_config(), &server),
            Arc::new(RecordingSink::default()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, InstallerError::ProcessExecution(_)));

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/started/node1"]);
}

#[tokio::test]
async fn test_delivery_failure_is_reported_not_fatal() {
    let server = RecordingServer::start().await;
    server.respond("/started/node1", 503, "unavailable");
    let dir = tempfile::tempdir().unwrap();
    let session = session(dir.path(), "true");

    let outcome = session
        .run(
            &with_hooks(valid_create_config(), &server),
            Arc::new(RecordingSink::default()),
        )
        .await
        .unwrap();

    assert_eq!(outcome.webhook_failures.len(), 1);
    assert_eq!(outcome.webhook_failures[0].event, InstallEvent::Started);
    assert!(outcome.webhook_failures[0].error.contains("503"));
    assert_eq!(server.requests_to("/completed/node1").len(), 1);
}
