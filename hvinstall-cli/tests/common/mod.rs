#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

pub struct TestContext {
    pub cmd: Command,
    pub dir: TempDir,
}

impl TestContext {
    /// A fresh command sharing this context's directory and cmdline.
    pub fn new_cmd(&self) -> Command {
        base_cmd(self.dir.path())
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write test file");
        path
    }
}

fn base_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hvinstall"));
    cmd.timeout(Duration::from_secs(30));
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("HVINSTALL_CONFIG");
    cmd.env_remove("HVINSTALL_CONFIG_URL");
    cmd.arg("--cmdline").arg(dir.join("cmdline"));
    cmd.arg("--temp-dir").arg(dir);
    cmd
}

/// Context whose kernel command line is `cmdline`.
pub fn hvinstall(cmdline: &str) -> TestContext {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("cmdline"), cmdline).expect("write cmdline");
    let cmd = base_cmd(dir.path());
    TestContext { cmd, dir }
}
