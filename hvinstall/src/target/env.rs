//! Environment side-channel for the install process.
//!
//! The install binary reads part of its input (notably the install options)
//! from `KEY=VALUE` variables instead of the document. Keys are the
//! document's field names in upper snake case, with nested sections joined by
//! `_`: `k3os.install.device` becomes `K3OS_INSTALL_DEVICE`.

use hvinstall_shared::errors::{InstallerError, InstallerResult};
use serde_json::Value;

use super::types::TargetConfig;

/// Encode `cfg` (including install options) as sorted `KEY=VALUE` strings.
pub fn to_env(cfg: &TargetConfig) -> InstallerResult<Vec<String>> {
    let value = serde_json::to_value(cfg)
        .map_err(|e| InstallerError::Generation(format!("Failed to encode config: {}", e)))?;

    let mut vars = Vec::new();
    if let Value::Object(map) = &value {
        collect("", map, &mut vars);
    }
    vars.sort();
    Ok(vars)
}

fn collect(prefix: &str, map: &serde_json::Map<String, Value>, vars: &mut Vec<String>) {
    for (key, value) in map {
        let name = format!("{}{}", prefix, to_env_key(key));
        match value {
            Value::Object(inner) => collect(&format!("{}_", name), inner, vars),
            other => {
                if let Some(text) = render(other) {
                    vars.push(format!("{}={}", name, text));
                }
            }
        }
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => {
            let scalars: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Value::Object(_) | Value::Array(_) => None,
                    scalar => render(scalar),
                })
                .collect();
            Some(match scalars {
                Some(scalars) => format!("[{}]", scalars.join(" ")),
                None => value.to_string(),
            })
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

/// `ntpServers` -> `NTP_SERVERS`, `ssh_authorized_keys` -> `SSH_AUTHORIZED_KEYS`.
pub fn to_env_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;
    for c in key.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c.to_ascii_uppercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::types::{TargetInstall, TargetWifi};

    #[test]
    fn test_env_key_conversion() {
        assert_eq!(to_env_key("ntpServers"), "NTP_SERVERS");
        assert_eq!(to_env_key("k3sArgs"), "K3S_ARGS");
        assert_eq!(to_env_key("forceEfi"), "FORCE_EFI");
        assert_eq!(to_env_key("ssh_authorized_keys"), "SSH_AUTHORIZED_KEYS");
        assert_eq!(to_env_key("k3os"), "K3OS");
    }

    #[test]
    fn test_env_includes_install_options() {
        let mut cfg = TargetConfig {
            hostname: "node1".into(),
            ssh_authorized_keys: vec!["key-a".into(), "key-b".into()],
            ..Default::default()
        };
        cfg.k3os.k3s_args = vec!["server".into(), "--cluster-init".into()];
        cfg.k3os.install = Some(TargetInstall {
            device: "/dev/sda".into(),
            silent: true,
            config_url: "/tmp/k3os.abc".into(),
            ..Default::default()
        });

        let env = to_env(&cfg).unwrap();

        assert!(env.contains(&"HOSTNAME=node1".to_string()));
        assert!(env.contains(&"SSH_AUTHORIZED_KEYS=[key-a key-b]".to_string()));
        assert!(env.contains(&"K3OS_K3S_ARGS=[server --cluster-init]".to_string()));
        assert!(env.contains(&"K3OS_INSTALL_DEVICE=/dev/sda".to_string()));
        assert!(env.contains(&"K3OS_INSTALL_SILENT=true".to_string()));
        assert!(env.contains(&"K3OS_INSTALL_CONFIG_URL=/tmp/k3os.abc".to_string()));
        assert!(!env.iter().any(|v| v.starts_with("K3OS_INSTALL_FORCE_EFI")));

        let mut sorted = env.clone();
        sorted.sort();
        assert_eq!(env, sorted);
    }

    #[test]
    fn test_env_renders_object_lists_as_json() {
        let mut cfg = TargetConfig::default();
        cfg.k3os.wifi = vec![TargetWifi { name: "home".into(), passphrase: "pw".into() }];

        let env = to_env(&cfg).unwrap();
        assert_eq!(
            env,
            vec![r#"K3OS_WIFI=[{"name":"home","passphrase":"pw"}]"#.to_string()]
        );
    }

    #[test]
    fn test_env_nests_map_keys() {
        let mut cfg = TargetConfig::default();
        cfg.k3os.labels.insert("harvester.cattle.io/managed".into(), "true".into());

        let env = to_env(&cfg).unwrap();
        assert_eq!(env, vec!["K3OS_LABELS_HARVESTER.CATTLE.IO/MANAGED=true".to_string()]);
    }
}
