//! Supervised execution of the external install binary.
//!
//! The target document is split across two channels: the install options go
//! into the child's environment, everything else into a private temp file
//! whose path the child learns from `K3OS_INSTALL_CONFIG_URL`.

mod log_stream;
mod sink;

pub use sink::{ChannelSink, ConsoleLine, ConsoleSink, StreamKind, TracingSink};

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::Arc,
};

use hvinstall_shared::constants::install;
use hvinstall_shared::errors::{InstallerError, InstallerResult};
use serde::{Deserialize, Serialize};

use crate::target::{TargetConfig, to_env};
use log_stream::StreamReaders;

/// Where the install binary lives and where its config file is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorOptions {
    #[serde(default = "default_install_binary")]
    pub install_binary: PathBuf,

    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

fn default_install_binary() -> PathBuf {
    PathBuf::from(install::BINARY)
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from(install::TEMP_DIR)
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            install_binary: default_install_binary(),
            temp_dir: default_temp_dir(),
        }
    }
}

/// Runs the install binary for one target document.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    options: ExecutorOptions,
}

impl Executor {
    pub fn new(options: ExecutorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Write the config, run the install binary and stream its output to
    /// `sink` until both pipes close and the process exits.
    ///
    /// Returns the path of the written config file, which is left on disk.
    pub fn execute(
        &self,
        target: &TargetConfig,
        sink: Arc<dyn ConsoleSink>,
    ) -> InstallerResult<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix(install::TEMP_PREFIX)
            .tempfile_in(&self.options.temp_dir)
            .map_err(|e| {
                InstallerError::Generation(format!(
                    "Failed to create config file in {}: {}",
                    self.options.temp_dir.display(),
                    e
                ))
            })?;

        let config_path = file.path().display().to_string();
        let mut full = target.clone();
        full.k3os.install.get_or_insert_with(Default::default).config_url = config_path.clone();

        let env = to_env(&full)?;
        let document = full
            .without_install()
            .to_yaml()
            .map_err(|e| InstallerError::Generation(format!("Failed to encode config: {}", e)))?;

        file.write_all(document.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| {
                InstallerError::Generation(format!(
                    "Failed to write config to {}: {}",
                    config_path, e
                ))
            })?;

        let (_, path) = file.keep().map_err(|e| {
            InstallerError::Generation(format!("Failed to keep config file: {}", e))
        })?;

        tracing::info!(
            binary = %self.options.install_binary.display(),
            config = %path.display(),
            env_vars = env.len(),
            "Starting install process"
        );

        run_install(&self.options.install_binary, &env, sink)?;
        Ok(path)
    }
}

fn run_install(
    binary: &Path,
    env: &[String],
    sink: Arc<dyn ConsoleSink>,
) -> InstallerResult<()> {
    let mut cmd = Command::new(binary);
    cmd.envs(env.iter().filter_map(|var| var.split_once('=')));
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        InstallerError::ProcessLaunch(format!(
            "Failed to start {}: {}",
            binary.display(),
            e
        ))
    })?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(InstallerError::ProcessLaunch(
            "install process started without output pipes".to_string(),
        ));
    };

    let readers = match StreamReaders::spawn(stdout, stderr, sink) {
        Ok(readers) => readers,
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
    };

    if let Err(e) = readers.join() {
        let _ = child.kill();
        let _ = child.wait();
        return Err(e);
    }

    let status = child.wait().map_err(|e| {
        InstallerError::ProcessExecution(format!("Failed to wait for install process: {}", e))
    })?;

    if !status.success() {
        return Err(InstallerError::ProcessExecution(format!(
            "install process exited with {}",
            status
        )));
    }

    tracing::info!("Install process finished");
    Ok(())
}
