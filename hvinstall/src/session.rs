//! One install attempt, from a resolved config to a finished install.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hvinstall_shared::errors::{InstallerError, InstallerResult};
use hvinstall_shared::events::InstallEvent;

use crate::config::ResolvedConfig;
use crate::executor::{ConsoleSink, Executor};
use crate::options::InstallerOptions;
use crate::target::generate;
use crate::validation::{HostProbe, validate};
use crate::webhooks::{prepare_webhooks, webhook_context};

/// A webhook delivery that failed without stopping the install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookFailure {
    pub event: InstallEvent,
    pub error: String,
}

/// What a successful install left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOutcome {
    /// The config document handed to the install binary.
    pub config_path: PathBuf,
    pub webhook_failures: Vec<WebhookFailure>,
}

/// Drives validate, generate, execute, firing webhooks around execution.
pub struct InstallSession {
    host: Arc<dyn HostProbe>,
    executor: Executor,
    http_timeout: Duration,
}

impl InstallSession {
    pub fn new(host: Arc<dyn HostProbe>, executor: Executor, http_timeout: Duration) -> Self {
        Self {
            host,
            executor,
            http_timeout,
        }
    }

    pub fn from_options(host: Arc<dyn HostProbe>, options: &InstallerOptions) -> Self {
        Self::new(
            host,
            Executor::new(options.executor.clone()),
            options.http_timeout(),
        )
    }

    /// Run one install of `cfg`, streaming process output to `sink`.
    ///
    /// Validation, webhook preparation, generation and execution failures end
    /// the attempt. Delivery failures are logged and reported in the outcome.
    pub async fn run(
        &self,
        cfg: &ResolvedConfig,
        sink: Arc<dyn ConsoleSink>,
    ) -> InstallerResult<InstallOutcome> {
        validate(cfg, self.host.as_ref())?;

        let webhooks = prepare_webhooks(&cfg.install().webhooks, &webhook_context(cfg))?;
        let target = generate(cfg);

        let mut outcome = InstallOutcome::default();

        if let Err(e) = webhooks.dispatch(InstallEvent::Started, self.http_timeout).await {
            tracing::warn!(event = %InstallEvent::Started, error = %e, "Webhook delivery failed");
            outcome.webhook_failures.push(WebhookFailure {
                event: InstallEvent::Started,
                error: e.to_string(),
            });
        }

        let executor = self.executor.clone();
        outcome.config_path = tokio::task::spawn_blocking(move || executor.execute(&target, sink))
            .await
            .map_err(|e| InstallerError::Internal(format!("Install task failed: {}", e)))??;

        if let Err(e) = webhooks.dispatch(InstallEvent::Completed, self.http_timeout).await {
            tracing::warn!(event = %InstallEvent::Completed, error = %e, "Webhook delivery failed");
            outcome.webhook_failures.push(WebhookFailure {
                event: InstallEvent::Completed,
                error: e.to_string(),
            });
        }

        tracing::info!(
            config = %outcome.config_path.display(),
            webhook_failures = outcome.webhook_failures.len(),
            "Install finished"
        );
        Ok(outcome)
    }
}
