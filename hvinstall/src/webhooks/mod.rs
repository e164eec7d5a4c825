//! Lifecycle webhooks: templated HTTP notifications sent on install events.
//!
//! Definitions are rendered once per session with [`prepare_webhooks`]; the
//! resulting [`RenderedWebhooks`] are then dispatched per event.

mod dispatch;
mod render;

pub use dispatch::{RenderedWebhooks, send_webhook};
pub use render::render_template;

use std::collections::HashMap;

use hvinstall_shared::errors::{InstallerError, InstallerResult};
use hvinstall_shared::events::InstallEvent;

use crate::config::{ResolvedConfig, WebhookDefinition};

/// Methods a webhook may use.
pub const HTTP_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE",
];

/// A definition with its URL and payload rendered for one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWebhook {
    pub definition: WebhookDefinition,
    pub event: InstallEvent,
    /// Upper-cased, validated method.
    pub method: String,
    pub url: String,
    pub payload: String,
}

/// Validate and render every definition; the first bad one fails the batch.
pub fn prepare_webhooks(
    definitions: &[WebhookDefinition],
    context: &HashMap<String, String>,
) -> InstallerResult<RenderedWebhooks> {
    let mut rendered = Vec::with_capacity(definitions.len());
    for definition in definitions {
        rendered.push(prepare_one(definition, context)?);
    }
    tracing::debug!(count = rendered.len(), "Prepared webhooks");
    Ok(RenderedWebhooks::new(rendered))
}

fn prepare_one(
    definition: &WebhookDefinition,
    context: &HashMap<String, String>,
) -> InstallerResult<RenderedWebhook> {
    let event: InstallEvent = definition.event.parse()?;

    let method = definition.method.to_uppercase();
    if !HTTP_METHODS.contains(&method.as_str()) {
        return Err(InstallerError::WebhookConfig(format!(
            "unknown HTTP method: {:?}",
            definition.method
        )));
    }

    let url = render_template(&definition.url, context)
        .map_err(|e| InstallerError::WebhookConfig(format!("url of {} webhook: {}", event, e)))?;
    let payload = render_template(&definition.payload, context).map_err(|e| {
        InstallerError::WebhookConfig(format!("payload of {} webhook: {}", event, e))
    })?;

    Ok(RenderedWebhook {
        definition: definition.clone(),
        event,
        method,
        url,
        payload,
    })
}

/// Template variables available to webhook URLs and payloads.
pub fn webhook_context(cfg: &ResolvedConfig) -> HashMap<String, String> {
    let install = cfg.install();
    HashMap::from([
        ("Hostname".to_string(), cfg.os.hostname.clone()),
        ("ServerURL".to_string(), cfg.server_url.clone()),
        ("Mode".to_string(), install.mode.clone()),
        ("Device".to_string(), install.device.clone()),
        ("ManagementInterface".to_string(), install.mgmt_interface.clone()),
    ])
}
