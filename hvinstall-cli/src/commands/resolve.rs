use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use hvinstall::config::remote::server_url_from_env_data;

use super::{ConfigOverrides, load_config};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Print secrets instead of `<redacted>`
    #[arg(long)]
    pub show_secrets: bool,

    /// Print the management URL of an installed node from its k3s env file and exit
    #[arg(long, value_name = "FILE")]
    pub k3s_env: Option<PathBuf>,
}

pub async fn execute(args: ResolveArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    if let Some(path) = &args.k3s_env {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let url = server_url_from_env_data(&data)
            .with_context(|| format!("No K3S_URL found in {}", path.display()))?;
        println!("{}", url);
        return Ok(());
    }

    let cfg = load_config(global, &args.overrides).await?;
    let shown = if args.show_secrets { cfg } else { cfg.redacted() };
    print!("{}", serde_yaml::to_string(&shown)?);
    Ok(())
}
