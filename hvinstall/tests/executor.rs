use std::sync::Arc;

use hvinstall::executor::{ChannelSink, Executor, ExecutorOptions, StreamKind, TracingSink};
use hvinstall::target::{TargetConfig, generate};
use hvinstall::InstallerError;
use hvinstall_test_utils::{RecordingSink, valid_create_config, write_script};

fn executor(dir: &std::path::Path, script: &str) -> Executor {
    Executor::new(ExecutorOptions {
        install_binary: write_script(dir, "install", script),
        temp_dir: dir.to_path_buf(),
    })
}

fn target() -> TargetConfig {
    generate(&valid_create_config())
}

#[test]
fn test_options_travel_by_env_and_rest_by_file() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(
        dir.path(),
        r#"echo "device=$K3OS_INSTALL_DEVICE"
echo "config=$K3OS_INSTALL_CONFIG_URL"
echo "args=$K3OS_K3S_ARGS""#,
    );

    let sink = Arc::new(RecordingSink::default());
    let path = exec.execute(&target(), sink.clone()).unwrap();

    let stdout = sink.stdout();
    assert_eq!(stdout[0], "device=/dev/sda");
    assert_eq!(stdout[1], format!("config={}", path.display()));
    assert_eq!(
        stdout[2],
        "args=[server --cluster-init --disable local-storage --flannel-iface eth0]"
    );

    assert!(path.exists());
    assert!(
        path.file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("k3os.")
    );

    let written: TargetConfig =
        serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(written.k3os.install.is_none());
    assert_eq!(written.hostname, "node1");
    assert_eq!(written.write_files.len(), 1);
    assert_eq!(
        written.k3os.k3s_args,
        vec![
            "server",
            "--cluster-init",
            "--disable",
            "local-storage",
            "--flannel-iface",
            "eth0"
        ]
    );
}

#[test]
fn test_both_streams_forwarded_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(
        dir.path(),
        "echo out-1\necho err-1 >&2\necho out-2\necho err-2 >&2\necho out-3",
    );

    let sink = Arc::new(RecordingSink::default());
    exec.execute(&target(), sink.clone()).unwrap();

    assert_eq!(sink.stdout(), vec!["out-1", "out-2", "out-3"]);
    assert_eq!(sink.stderr(), vec!["err-1", "err-2"]);
    assert_eq!(sink.lines().len(), 5);
    assert!(
        sink.lines()
            .iter()
            .all(|l| matches!(l.stream, StreamKind::Stdout | StreamKind::Stderr))
    );
}

#[test]
fn test_non_utf8_output_is_forwarded_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(
        dir.path(),
        "printf 'before\\n'\nprintf 'progress \\377\\r\\n'\nprintf 'after\\n'\nprintf 'tail'",
    );

    let sink = Arc::new(RecordingSink::default());
    exec.execute(&target(), sink.clone()).unwrap();

    assert_eq!(
        sink.stdout(),
        vec!["before", "progress \u{FFFD}", "after", "tail"]
    );
}

#[test]
fn test_parent_environment_is_inherited() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(dir.path(), r#"echo "path-set=${PATH:+yes}""#);

    let sink = Arc::new(RecordingSink::default());
    exec.execute(&target(), sink.clone()).unwrap();
    assert_eq!(sink.stdout(), vec!["path-set=yes"]);
}

#[test]
fn test_non_zero_exit_is_execution_failure() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(dir.path(), "echo partitioning\necho 'no space left' >&2\nexit 3");

    let sink = Arc::new(RecordingSink::default());
    let err = exec.execute(&target(), sink.clone()).unwrap_err();

    assert!(matches!(err, InstallerError::ProcessExecution(_)));
    assert_eq!(sink.stdout(), vec!["partitioning"]);
    assert_eq!(sink.stderr(), vec!["no space left"]);
}

#[test]
fn test_missing_binary_is_launch_failure() {
    let dir = tempfile::tempdir().unwrap();
    let exec = Executor::new(ExecutorOptions {
        install_binary: dir.path().join("does-not-exist"),
        temp_dir: dir.path().to_path_buf(),
    });

    let err = exec
        .execute(&target(), Arc::new(RecordingSink::default()))
        .unwrap_err();
    assert!(matches!(err, InstallerError::ProcessLaunch(_)));
    assert!(err.to_string().contains("does-not-exist"));
}

#[test]
fn test_missing_temp_dir_fails_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    let exec = Executor::new(ExecutorOptions {
        install_binary: write_script(dir.path(), "install", "touch ran"),
        temp_dir: dir.path().join("nope"),
    });

    let err = exec
        .execute(&target(), Arc::new(RecordingSink::default()))
        .unwrap_err();
    assert!(matches!(err, InstallerError::Generation(_)));
}

#[test]
fn test_channel_sink_receives_lines() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(dir.path(), "echo hello\necho warn >&2");

    let (sink, mut rx) = ChannelSink::channel();
    exec.execute(&target(), Arc::new(sink)).unwrap();

    let mut lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
        lines.push((line.stream, line.text));
    }
    lines.sort_by_key(|(stream, _)| *stream == StreamKind::Stderr);
    assert_eq!(
        lines,
        vec![
            (StreamKind::Stdout, "hello".to_string()),
            (StreamKind::Stderr, "warn".to_string()),
        ]
    );
}

#[test]
fn test_tracing_sink_accepts_output() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(dir.path(), "echo logged");
    exec.execute(&target(), Arc::new(TracingSink)).unwrap();
}
