//! Error type shared by all hvinstall crates.

use thiserror::Error;

/// Result alias used across the installer.
pub type InstallerResult<T> = Result<T, InstallerError>;

/// Every failure the installer core can surface.
///
/// Each variant carries a human-readable message that already embeds the
/// offending value, so callers can print it as-is.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// A configuration source existed but could not be read or parsed.
    #[error("source read failure: {0}")]
    SourceRead(String),

    /// The merged key-path store could not be bound to the typed config.
    #[error("mapping failure: {0}")]
    Mapping(String),

    /// A business rule rejected the resolved configuration.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// The target configuration could not be serialized.
    #[error("generation failure: {0}")]
    Generation(String),

    /// The install process (or its temp file) could not be prepared or started.
    #[error("process launch failure: {0}")]
    ProcessLaunch(String),

    /// Reading the install process output failed.
    #[error("process stream failure: {0}")]
    ProcessStream(String),

    /// The install process ran but exited unsuccessfully.
    #[error("process execution failure: {0}")]
    ProcessExecution(String),

    /// A webhook definition is invalid (bad event, method or template).
    #[error("webhook config: {0}")]
    WebhookConfig(String),

    /// A webhook could not be delivered or was rejected by the receiver.
    #[error("webhook delivery failure: {0}")]
    WebhookDelivery(String),

    /// HTTP transport or status failure while fetching a document.
    #[error("network error: {0}")]
    Network(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl InstallerError {
    /// Short, stable name of the error kind (used as a tracing field).
    pub fn kind(&self) -> &'static str {
        match self {
            InstallerError::SourceRead(_) => "source_read",
            InstallerError::Mapping(_) => "mapping",
            InstallerError::Validation(_) => "validation",
            InstallerError::Generation(_) => "generation",
            InstallerError::ProcessLaunch(_) => "process_launch",
            InstallerError::ProcessStream(_) => "process_stream",
            InstallerError::ProcessExecution(_) => "process_execution",
            InstallerError::WebhookConfig(_) => "webhook_config",
            InstallerError::WebhookDelivery(_) => "webhook_delivery",
            InstallerError::Network(_) => "network",
            InstallerError::Internal(_) => "internal",
        }
    }
}
