use clap::Args;
use hvinstall::target::{generate, to_env};

use super::{ConfigOverrides, load_config};

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Print the environment variables instead of the document
    #[arg(long)]
    pub env: bool,
}

/// Generation does not consult the host, so this works on any machine.
pub async fn execute(args: RenderArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let cfg = load_config(global, &args.overrides).await?;
    let target = generate(&cfg);

    if args.env {
        for var in to_env(&target)? {
            println!("{}", var);
        }
    } else {
        print!("{}", target.without_install().to_yaml()?);
    }
    Ok(())
}
