//! Delivery of rendered webhooks for an install event.

use std::time::Duration;

use hvinstall_shared::errors::{InstallerError, InstallerResult};
use hvinstall_shared::events::InstallEvent;
use reqwest::Method;

use super::RenderedWebhook;
use crate::net::{HttpOptions, http_client, is_success_status};

/// Webhooks prepared for one session, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedWebhooks {
    hooks: Vec<RenderedWebhook>,
}

impl RenderedWebhooks {
    pub fn new(hooks: Vec<RenderedWebhook>) -> Self {
        Self { hooks }
    }

    pub fn as_slice(&self) -> &[RenderedWebhook] {
        &self.hooks
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Send every webhook registered for `event`, one after another.
    ///
    /// Stops at the first failed delivery; later webhooks for the same event
    /// are not attempted.
    pub async fn dispatch(&self, event: InstallEvent, timeout: Duration) -> InstallerResult<()> {
        for hook in self.hooks.iter().filter(|hook| hook.event == event) {
            send_webhook(hook, timeout).await?;
        }
        Ok(())
    }
}

/// Deliver a single rendered webhook.
pub async fn send_webhook(hook: &RenderedWebhook, timeout: Duration) -> InstallerResult<()> {
    let client = http_client(HttpOptions {
        timeout,
        insecure: hook.definition.insecure,
    })?;

    let method = Method::from_bytes(hook.method.as_bytes()).map_err(|e| {
        InstallerError::WebhookConfig(format!("unknown HTTP method: {:?}: {}", hook.method, e))
    })?;

    let mut request = client.request(method, &hook.url);
    for (name, values) in &hook.definition.headers {
        for value in values {
            request = request.header(name.as_str(), value.as_str());
        }
    }
    let auth = &hook.definition.basic_auth;
    if auth.is_set() {
        request = request.basic_auth(&auth.user, Some(&auth.password));
    }
    if !hook.payload.is_empty() {
        request = request.body(hook.payload.clone());
    }

    tracing::info!(event = %hook.event, method = %hook.method, url = %hook.url, "Sending webhook");
    let response = request.send().await.map_err(|e| {
        InstallerError::WebhookDelivery(format!("{} {} failed: {}", hook.method, hook.url, e))
    })?;

    let status = response.status();
    if !is_success_status(status) {
        let body = response.text().await.unwrap_or_default();
        return Err(InstallerError::WebhookDelivery(format!(
            "got {} status code from {}, body: {}",
            status.as_u16(),
            hook.url,
            body
        )));
    }

    tracing::debug!(event = %hook.event, status = status.as_u16(), "Webhook delivered");
    Ok(())
}
