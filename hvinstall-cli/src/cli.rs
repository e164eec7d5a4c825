use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hvinstall::{ExecutorOptions, InstallerOptions};

use crate::commands::{
    install::InstallArgs, render::RenderArgs, resolve::ResolveArgs, validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(name = "hvinstall", version, about = "Resolve, validate and run node installs")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved configuration
    Resolve(ResolveArgs),
    /// Check the resolved configuration against this host
    Validate(ValidateArgs),
    /// Print the document and environment handed to the install binary
    Render(RenderArgs),
    /// Validate, then run the install
    Install(InstallArgs),
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Kernel command line holding `harvester.*` boot parameters
    #[arg(long, global = true, env = "HVINSTALL_CMDLINE", default_value = "/proc/cmdline")]
    pub cmdline: PathBuf,

    /// Local config document, applied over every other source
    #[arg(long, global = true, env = "HVINSTALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remote config document (default: os.install.config_url from boot parameters)
    #[arg(long, global = true, env = "HVINSTALL_CONFIG_URL")]
    pub config_url: Option<String>,

    /// Install binary to run
    #[arg(
        long,
        global = true,
        env = "HVINSTALL_INSTALL_BINARY",
        default_value = "/usr/libexec/k3os/install"
    )]
    pub install_binary: PathBuf,

    /// Directory for the generated config file
    #[arg(long, global = true, env = "HVINSTALL_TEMP_DIR", default_value = "/tmp")]
    pub temp_dir: PathBuf,

    /// Timeout of HTTP requests in seconds
    #[arg(long, global = true, env = "HVINSTALL_HTTP_TIMEOUT", default_value_t = 15)]
    pub http_timeout: u64,

    /// Write logs to a daily-rotated file in this directory instead of stderr
    #[arg(long, global = true, env = "HVINSTALL_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalFlags {
    pub fn options(&self) -> InstallerOptions {
        InstallerOptions {
            cmdline_path: self.cmdline.clone(),
            local_config: self.config.clone(),
            remote_config_url: self.config_url.clone(),
            executor: ExecutorOptions {
                install_binary: self.install_binary.clone(),
                temp_dir: self.temp_dir.clone(),
            },
            http_timeout_secs: self.http_timeout,
            log_dir: self.log_dir.clone(),
        }
    }
}
