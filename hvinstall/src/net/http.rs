use std::time::Duration;

use hvinstall_shared::constants::http as const_http;
use hvinstall_shared::errors::{InstallerError, InstallerResult};
use reqwest::StatusCode;

/// Client settings for one outbound request.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub timeout: Duration,
    /// Skip TLS certificate verification.
    pub insecure: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(const_http::TIMEOUT_SECS),
            insecure: false,
        }
    }
}

/// Build a client honoring `options`.
pub fn http_client(options: HttpOptions) -> InstallerResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(options.timeout)
        .danger_accept_invalid_certs(options.insecure)
        .build()
        .map_err(|e| InstallerError::Network(format!("Failed to build HTTP client: {}", e)))
}

/// Statuses in `[200, 400)` count as success.
pub fn is_success_status(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

/// GET `url` and return the body.
///
/// Any status outside `[200, 400)` is an error that embeds the response body.
pub async fn fetch_url(url: &str, options: HttpOptions) -> InstallerResult<Vec<u8>> {
    let client = http_client(options)?;

    tracing::debug!(url, timeout_secs = options.timeout.as_secs(), "Fetching document");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| InstallerError::Network(format!("GET {} failed: {}", url, e)))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| InstallerError::Network(format!("Failed to read body from {}: {}", url, e)))?;

    if !is_success_status(status) {
        return Err(InstallerError::Network(format!(
            "got {} status code from {}, body: {}",
            status.as_u16(),
            url,
            String::from_utf8_lossy(&body)
        )));
    }

    Ok(body.to_vec())
}
