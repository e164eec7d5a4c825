//! Configuration resolution and install orchestration for bare-metal nodes.
//!
//! The pipeline: boot parameters, remote and local documents are parsed into
//! key-path stores, merged and mapped into a [`ResolvedConfig`]; the config is
//! validated against the host, projected into the target platform's
//! cloud-config and handed to the install binary, with webhooks fired around
//! the install.

pub mod config;
pub mod executor;
pub mod net;
pub mod options;
pub mod session;
pub mod target;
pub mod util;
pub mod validation;
pub mod webhooks;

pub use config::{ConfigSources, KeyPathStore, ResolvedConfig, resolve};
pub use executor::{ChannelSink, ConsoleSink, Executor, ExecutorOptions, StreamKind, TracingSink};
pub use hvinstall_shared::errors::{InstallerError, InstallerResult};
pub use hvinstall_shared::events::InstallEvent;
pub use options::InstallerOptions;
pub use session::{InstallOutcome, InstallSession, WebhookFailure};
pub use target::{TargetConfig, generate};
pub use validation::{HostProbe, SystemHost, validate};
pub use webhooks::{RenderedWebhook, RenderedWebhooks, prepare_webhooks, webhook_context};
