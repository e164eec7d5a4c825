pub mod install;
pub mod render;
pub mod resolve;
pub mod validate;

use anyhow::Context;
use clap::Args;
use hvinstall::ResolvedConfig;
use hvinstall::config::remote::{fetch_remote_ssh_keys, format_server_url};

use crate::cli::GlobalFlags;

/// Adjustments applied on top of the resolved configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Fetch authorized SSH keys from this URL and add them
    #[arg(long)]
    pub ssh_keys_url: Option<String>,

    /// Server to join; `https://` and port 6443 are added when missing
    #[arg(long)]
    pub server: Option<String>,
}

/// Resolve every configured source and apply `overrides`.
pub async fn load_config(
    global: &GlobalFlags,
    overrides: &ConfigOverrides,
) -> anyhow::Result<ResolvedConfig> {
    let options = global.options();
    let mut cfg = hvinstall::resolve(&options.sources()).await?;

    if let Some(url) = &overrides.ssh_keys_url {
        let keys = fetch_remote_ssh_keys(url, options.http())
            .await
            .with_context(|| format!("Failed to fetch SSH keys from {}", url))?;
        for key in keys {
            if !cfg.os.ssh_authorized_keys.contains(&key) {
                cfg.os.ssh_authorized_keys.push(key);
            }
        }
    }

    if let Some(server) = &overrides.server {
        cfg.server_url = format_server_url(server);
    }

    Ok(cfg)
}
