use clap::Args;
use hvinstall::SystemHost;

use super::{ConfigOverrides, load_config};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

pub async fn execute(args: ValidateArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let cfg = load_config(global, &args.overrides).await?;
    hvinstall::validate(&cfg, &SystemHost)?;
    println!("configuration is valid for {:?} mode", cfg.install().mode);
    Ok(())
}
