//! Installer configuration: raw sources, the key-path store they are parsed
//! into, and the mapper that turns the merged store into a [`ResolvedConfig`].

pub mod cmdline;
pub mod remote;
pub mod schema;
pub mod sources;
pub mod store;
pub mod types;

pub use cmdline::{parse_boot_parameters, read_boot_parameters, read_boot_parameters_from};
pub use schema::{Schema, map_store};
pub use sources::{
    ConfigSources, merge_layers, read_local_config, read_remote_config, resolve,
};
pub use store::{KeyPathStore, StoreValue};
pub use types::{
    BasicAuth, InstallOptions, OsConfig, ResolvedConfig, WebhookDefinition, WifiNetwork,
};
