//! Helpers for values that come from, or point at, remote systems.

use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hvinstall_shared::constants::http as const_http;
use hvinstall_shared::errors::{InstallerError, InstallerResult};
use regex::Regex;

use crate::net::{HttpOptions, fetch_url};

const KEY_TYPES: &[&str] = &[
    "ssh-rsa",
    "ssh-dss",
    "ssh-ed25519",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
    "sk-ssh-ed25519@openssh.com",
    "sk-ecdsa-sha2-nistp256@openssh.com",
];

/// Fetch an `authorized_keys` document and return its keys in order.
///
/// Blank lines are skipped; any other line must be a public key.
pub async fn fetch_remote_ssh_keys(url: &str, http: HttpOptions) -> InstallerResult<Vec<String>> {
    let body = fetch_url(url, http).await?;
    parse_authorized_keys(&String::from_utf8_lossy(&body))
}

/// Validate an `authorized_keys` document line by line.
pub fn parse_authorized_keys(text: &str) -> InstallerResult<Vec<String>> {
    let mut keys = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if !is_authorized_key(line) {
            return Err(InstallerError::SourceRead(format!(
                "fail to parse on line {}: {}",
                index + 1,
                line
            )));
        }
        keys.push(line.to_string());
    }
    if keys.is_empty() {
        return Err(InstallerError::SourceRead("no key found".to_string()));
    }
    Ok(keys)
}

/// A key line is `[options] <type> <base64 blob> [comment]`, where the blob
/// starts with the same key type.
fn is_authorized_key(line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let Some(position) = fields.iter().position(|field| KEY_TYPES.contains(field)) else {
        return false;
    };
    let Some(blob) = fields.get(position + 1) else {
        return false;
    };
    let Ok(decoded) = STANDARD.decode(blob) else {
        return false;
    };
    blob_key_type(&decoded) == Some(fields[position])
}

fn blob_key_type(blob: &[u8]) -> Option<&str> {
    let len_bytes: [u8; 4] = blob.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    let name = blob.get(4..4 + len)?;
    std::str::from_utf8(name).ok()
}

/// Complete a bare server address to `https://<addr>:6443`.
pub fn format_server_url(addr: &str) -> String {
    let mut url = addr.to_string();
    if !url.starts_with("https://") {
        url = format!("https://{}", url);
    }
    let port_suffix = format!(":{}", const_http::SERVER_PORT);
    if !url.ends_with(&port_suffix) {
        url.push_str(&port_suffix);
    }
    url
}

/// Extract `K3S_URL` from env-file content, rewritten to the management port.
///
/// Returns `None` when the file has no `K3S_URL` entry.
pub fn server_url_from_env_data(data: &str) -> Option<String> {
    static K3S_URL: OnceLock<Regex> = OnceLock::new();
    let pattern =
        K3S_URL.get_or_init(|| Regex::new(r"K3S_URL=(.*)\b").expect("K3S_URL pattern is valid"));

    let server_url = pattern.captures(data)?.get(1)?.as_str();
    let colon = server_url.rfind(':')?;
    Some(format!(
        "{}:{}",
        &server_url[..colon],
        const_http::MANAGEMENT_PORT
    ))
}
