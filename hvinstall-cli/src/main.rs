mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.debug { "debug" } else { "warn" };
    let _log_guard = hvinstall::util::init_logging(cli.global.log_dir.as_deref(), default_filter)?;

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &cli.global).await,
        Commands::Validate(args) => commands::validate::execute(args, &cli.global).await,
        Commands::Render(args) => commands::render::execute(args, &cli.global).await,
        Commands::Install(args) => commands::install::execute(args, &cli.global).await,
    }
}
