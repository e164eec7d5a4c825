//! Shared fixtures for hvinstall integration tests.

pub mod fixtures;
pub mod host;
pub mod server;
pub mod sink;

pub use fixtures::{valid_create_config, valid_join_config, write_cmdline, write_script};
pub use host::StaticHost;
pub use server::{RecordedRequest, RecordingServer};
pub use sink::RecordingSink;
