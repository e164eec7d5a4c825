//! Target platform configuration: the document and environment handed to the
//! install process.

mod env;
mod generate;
mod manifest;
mod types;

pub use env::{to_env, to_env_key};
pub use generate::generate;
pub use manifest::{CHART_VALUES, manifest_content, manifest_file};
pub use types::{NodeConfig, TargetConfig, TargetInstall, TargetWifi, WriteFile};
