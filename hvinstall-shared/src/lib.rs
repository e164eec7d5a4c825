//! hvinstall shared - types used by every hvinstall crate
//!
//! Holds the error type and the wire-level constants (boot namespace,
//! label names, lifecycle events) that the library, the CLI and the
//! test utilities all agree on.

pub mod constants;
pub mod errors;
pub mod events;

pub use errors::{InstallerError, InstallerResult};
pub use events::InstallEvent;
