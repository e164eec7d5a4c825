//! Typed installer configuration.

use std::collections::BTreeMap;

use hvinstall_shared::constants::modes;
use serde::{Deserialize, Serialize};

/// The fully resolved configuration of one install session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolvedConfig {
    /// Server to join; must be empty in create mode.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_url: String,

    /// Cluster join token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    #[serde(default)]
    pub os: OsConfig,
}

impl ResolvedConfig {
    /// Shorthand for `os.install`.
    pub fn install(&self) -> &InstallOptions {
        &self.os.install
    }

    /// Copy of this config with secrets replaced, suitable for logging.
    pub fn redacted(&self) -> ResolvedConfig {
        let mut copy = self.clone();
        redact(&mut copy.token);
        redact(&mut copy.os.password);
        for wifi in &mut copy.os.wifi {
            redact(&mut wifi.passphrase);
        }
        for hook in &mut copy.os.install.webhooks {
            redact(&mut hook.basic_auth.password);
        }
        copy
    }
}

fn redact(value: &mut String) {
    if !value.is_empty() {
        *value = "<redacted>".to_string();
    }
}

/// Operating system settings of the target node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_authorized_keys: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sysctls: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ntp_servers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_nameservers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wifi: Vec<WifiNetwork>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    #[serde(default)]
    pub install: InstallOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub passphrase: String,
}

/// How and where the node gets installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InstallOptions {
    /// `create` or `join`. Kept as text so validation can name bad values.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mgmt_interface: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub force_efi: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub silent: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub power_off: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub no_format: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,

    /// Unattended install requested from the boot loader.
    #[serde(default, skip_serializing_if = "is_false")]
    pub automatic: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iso_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tty: String,

    /// Where to fetch the remote config document from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub config_url: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub webhooks: Vec<WebhookDefinition>,
}

impl InstallOptions {
    pub fn is_create(&self) -> bool {
        self.mode == modes::CREATE
    }

    pub fn is_join(&self) -> bool {
        self.mode == modes::JOIN
    }
}

/// A webhook as written in the configuration, before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WebhookDefinition {
    /// `STARTED` or `COMPLETED`.
    #[serde(default)]
    pub event: String,

    /// HTTP verb, matched case-insensitively.
    #[serde(default)]
    pub method: String,

    /// URL template.
    #[serde(default)]
    pub url: String,

    /// Body template; an empty rendering sends no body.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Vec<String>>,

    /// Skip TLS certificate verification.
    #[serde(default, skip_serializing_if = "is_false")]
    pub insecure: bool,

    #[serde(default)]
    pub basic_auth: BasicAuth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

impl BasicAuth {
    /// Credentials are only sent when both parts are set.
    pub fn is_set(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
