//! Declarative node configuration consumed by the install process.
//!
//! Field names follow the platform's cloud-config schema, so the structs
//! serialize straight into the document the install binary expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of the generated cloud-config document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_authorized_keys: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub write_files: Vec<WriteFile>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,

    #[serde(default)]
    pub k3os: NodeConfig,
}

/// A file written onto the target during install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteFile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encoding: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub permissions: String,
}

/// Platform-specific section of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sysctls: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ntp_servers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_nameservers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wifi: Vec<TargetWifi>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub k3s_args: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// Delivered to the install process through the environment only; cleared
    /// before the document is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<TargetInstall>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWifi {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub passphrase: String,
}

/// Install options as understood by the install binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInstall {
    #[serde(default, skip_serializing_if = "is_false")]
    pub force_efi: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device: String,

    /// Path of the generated document; set by the executor.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub config_url: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub silent: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iso_url: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub power_off: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub no_format: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tty: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TargetConfig {
    /// Serialize to the YAML document handed to the install process.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Copy without the install options, i.e. what goes into the file.
    pub fn without_install(&self) -> TargetConfig {
        let mut copy = self.clone();
        copy.k3os.install = None;
        copy
    }
}
