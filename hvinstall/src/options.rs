//! Configuration for the installer itself.

use std::path::PathBuf;
use std::time::Duration;

use hvinstall_shared::constants::{boot, http as const_http};
use serde::{Deserialize, Serialize};

use crate::config::ConfigSources;
use crate::executor::ExecutorOptions;
use crate::net::HttpOptions;

/// Where configuration comes from and how the install binary is run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerOptions {
    /// Kernel command line holding the boot parameters.
    ///
    /// Default: /proc/cmdline
    #[serde(default = "default_cmdline_path")]
    pub cmdline_path: PathBuf,

    /// Local YAML document, merged over every other source.
    #[serde(default)]
    pub local_config: Option<PathBuf>,

    /// Remote YAML document.
    ///
    /// When unset, `os.install.config_url` from the boot parameters is used.
    #[serde(default)]
    pub remote_config_url: Option<String>,

    #[serde(default)]
    pub executor: ExecutorOptions,

    /// Timeout of every outbound HTTP request, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Directory for the rotated log file. Logs go to stderr when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_cmdline_path() -> PathBuf {
    PathBuf::from(boot::CMDLINE_PATH)
}

fn default_http_timeout_secs() -> u64 {
    const_http::TIMEOUT_SECS
}

impl Default for InstallerOptions {
    fn default() -> Self {
        Self {
            cmdline_path: default_cmdline_path(),
            local_config: None,
            remote_config_url: None,
            executor: ExecutorOptions::default(),
            http_timeout_secs: default_http_timeout_secs(),
            log_dir: None,
        }
    }
}

impl InstallerOptions {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn http(&self) -> HttpOptions {
        HttpOptions {
            timeout: self.http_timeout(),
            insecure: false,
        }
    }

    /// The config sources these options describe.
    pub fn sources(&self) -> ConfigSources {
        ConfigSources {
            cmdline_path: self.cmdline_path.clone(),
            remote_url: self.remote_config_url.clone(),
            local_path: self.local_config.clone(),
            http: self.http(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = InstallerOptions::default();
        assert_eq!(options.cmdline_path, PathBuf::from("/proc/cmdline"));
        assert_eq!(options.http_timeout(), Duration::from_secs(15));
        assert_eq!(
            options.executor.install_binary,
            PathBuf::from("/usr/libexec/k3os/install")
        );
        assert_eq!(options.executor.temp_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let options: InstallerOptions =
            serde_yaml::from_str("local_config: /etc/hvinstall.yaml\n").unwrap();
        assert_eq!(options.local_config, Some(PathBuf::from("/etc/hvinstall.yaml")));
        assert_eq!(options.cmdline_path, PathBuf::from("/proc/cmdline"));
        assert_eq!(options.http_timeout_secs, 15);
    }

    #[test]
    fn test_sources_carry_paths() {
        let options = InstallerOptions {
            remote_config_url: Some("http://cfg/harvester.yaml".into()),
            ..Default::default()
        };
        let sources = options.sources();
        assert_eq!(sources.remote_url.as_deref(), Some("http://cfg/harvester.yaml"));
        assert_eq!(sources.cmdline_path, options.cmdline_path);
        assert!(sources.local_path.is_none());
    }
}
