//! Source readers and layered resolution.
//!
//! Precedence, lowest to highest: boot parameters, remote document, local
//! document. Layers are merged as key-path stores and mapped once, so a later
//! layer overrides an earlier one leaf by leaf.

use std::path::{Path, PathBuf};

use hvinstall_shared::errors::{InstallerError, InstallerResult};

use super::cmdline::read_boot_parameters_from;
use super::schema::{Schema, map_store};
use super::store::KeyPathStore;
use super::types::ResolvedConfig;
use crate::net::{HttpOptions, fetch_url};

/// Where the configuration layers come from.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// Kernel command line file.
    pub cmdline_path: PathBuf,
    /// Remote document; when unset, `os.install.config_url` from the boot
    /// parameters is used.
    pub remote_url: Option<String>,
    /// Local document, applied last.
    pub local_path: Option<PathBuf>,
    pub http: HttpOptions,
}

/// Fetch a remote YAML document into a store.
pub async fn read_remote_store(url: &str, http: HttpOptions) -> InstallerResult<KeyPathStore> {
    let body = fetch_url(url, http).await?;
    let text = String::from_utf8(body).map_err(|e| {
        InstallerError::SourceRead(format!("remote config at {} is not UTF-8: {}", url, e))
    })?;
    KeyPathStore::from_yaml_str(&text)
        .map_err(|e| InstallerError::SourceRead(format!("remote config at {}: {}", url, e)))
}

/// Fetch and map a remote YAML document.
pub async fn read_remote_config(url: &str, http: HttpOptions) -> InstallerResult<ResolvedConfig> {
    map_store(&read_remote_store(url, http).await?)
}

/// Read a local YAML document into a store.
pub fn read_local_store(path: &Path) -> InstallerResult<KeyPathStore> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        InstallerError::SourceRead(format!("failed to read {}: {}", path.display(), e))
    })?;
    KeyPathStore::from_yaml_str(&text)
        .map_err(|e| InstallerError::SourceRead(format!("{}: {}", path.display(), e)))
}

/// Read and map a local YAML document.
pub fn read_local_config(path: &Path) -> InstallerResult<ResolvedConfig> {
    map_store(&read_local_store(path)?)
}

/// Merge the layers in precedence order.
///
/// Each layer is first brought to the canonical key spelling, so a later
/// layer wins at the same field however either source spells it.
pub fn merge_layers(
    boot: KeyPathStore,
    remote: Option<KeyPathStore>,
    local: Option<KeyPathStore>,
) -> KeyPathStore {
    let schema = Schema::global();
    let mut merged = schema.canonicalize(&boot);
    for layer in [remote, local].into_iter().flatten() {
        merged.merge(schema.canonicalize(&layer));
    }
    merged
}

/// Read every configured layer and map the merged result.
pub async fn resolve(sources: &ConfigSources) -> InstallerResult<ResolvedConfig> {
    let boot = read_boot_parameters_from(&sources.cmdline_path)?;

    let remote_url = match &sources.remote_url {
        Some(url) => Some(url.clone()),
        None => Schema::global()
            .get_scalar(&boot, "os.install.config_url")
            .filter(|url| !url.is_empty()),
    };

    let remote = match remote_url {
        Some(url) => {
            tracing::info!(url = %url, "Reading remote config");
            Some(read_remote_store(&url, sources.http).await?)
        }
        None => None,
    };

    let local = match &sources.local_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Reading local config");
            Some(read_local_store(path)?)
        }
        None => None,
    };

    let cfg = map_store(&merge_layers(boot, remote, local))?;
    tracing::debug!(config = ?cfg.redacted(), "Resolved install config");
    Ok(cfg)
}
