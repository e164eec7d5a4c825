use std::io::Write;
use std::sync::Arc;

use clap::Args;
use hvinstall::{ConsoleSink, InstallSession, StreamKind, SystemHost};

use super::{ConfigOverrides, load_config};

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Install even when the boot parameters did not request an automatic install
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Mirrors install output onto this process's stdout and stderr.
struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn line(&self, stream: StreamKind, text: &str) {
        let _ = match stream {
            StreamKind::Stdout => writeln!(std::io::stdout().lock(), "{}", text),
            StreamKind::Stderr => writeln!(std::io::stderr().lock(), "{}", text),
        };
    }
}

pub async fn execute(args: InstallArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let cfg = load_config(global, &args.overrides).await?;

    if !cfg.install().automatic && !args.yes {
        anyhow::bail!(
            "Refusing to install: os.install.automatic is not set; pass --yes to install anyway"
        );
    }

    tracing::info!(
        mode = %cfg.install().mode,
        device = %cfg.install().device,
        automatic = cfg.install().automatic,
        "Starting install"
    );
    let session = InstallSession::from_options(Arc::new(SystemHost), &global.options());
    let outcome = session.run(&cfg, Arc::new(StdoutSink)).await?;

    for failure in &outcome.webhook_failures {
        eprintln!("Warning: {} webhook failed: {}", failure.event, failure.error);
    }
    println!("Install finished, config written to {}", outcome.config_path.display());
    Ok(())
}
