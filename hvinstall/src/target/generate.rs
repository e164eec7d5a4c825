//! Projection of a resolved config onto the platform's cloud-config.

use hvinstall_shared::constants::{k3s_args, labels};

use super::manifest::manifest_file;
use super::types::{NodeConfig, TargetConfig, TargetInstall, TargetWifi};
use crate::config::{InstallOptions, ResolvedConfig};

/// Build the target document for `cfg`.
///
/// Every container is cloned out of `cfg`; the result shares nothing with it.
pub fn generate(cfg: &ResolvedConfig) -> TargetConfig {
    let os = &cfg.os;
    let install = &os.install;

    let mut target = TargetConfig {
        ssh_authorized_keys: os.ssh_authorized_keys.clone(),
        write_files: Vec::new(),
        hostname: os.hostname.clone(),
        k3os: NodeConfig {
            modules: os.modules.clone(),
            sysctls: os.sysctls.clone(),
            ntp_servers: os.ntp_servers.clone(),
            dns_nameservers: os.dns_nameservers.clone(),
            wifi: os
                .wifi
                .iter()
                .map(|w| TargetWifi {
                    name: w.name.clone(),
                    passphrase: w.passphrase.clone(),
                })
                .collect(),
            password: os.password.clone(),
            server_url: cfg.server_url.clone(),
            token: cfg.token.clone(),
            environment: os.environment.clone(),
            install: Some(target_install(install)),
            ..Default::default()
        },
    };

    target
        .k3os
        .labels
        .insert(labels::MANAGED.to_string(), "true".to_string());

    if install.is_join() {
        target.k3os.k3s_args = with_flannel(vec![k3s_args::AGENT], &install.mgmt_interface);
        tracing::debug!(args = ?target.k3os.k3s_args, "Generated join config");
        return target;
    }

    target
        .k3os
        .labels
        .insert(labels::ENABLE_LB.to_string(), "true".to_string());
    target.write_files.push(manifest_file());
    target.k3os.k3s_args = with_flannel(
        vec![
            k3s_args::SERVER,
            k3s_args::CLUSTER_INIT,
            k3s_args::DISABLE,
            k3s_args::LOCAL_STORAGE,
        ],
        &install.mgmt_interface,
    );
    tracing::debug!(args = ?target.k3os.k3s_args, "Generated create config");
    target
}

fn target_install(install: &InstallOptions) -> TargetInstall {
    TargetInstall {
        force_efi: install.force_efi,
        device: install.device.clone(),
        config_url: String::new(),
        silent: install.silent,
        iso_url: install.iso_url.clone(),
        power_off: install.power_off,
        no_format: install.no_format,
        debug: install.debug,
        tty: install.tty.clone(),
    }
}

fn with_flannel(base: Vec<&str>, iface: &str) -> Vec<String> {
    let mut args: Vec<String> = base.into_iter().map(String::from).collect();
    if !iface.is_empty() {
        args.push(k3s_args::FLANNEL_IFACE.to_string());
        args.push(iface.to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WifiNetwork;
    use hvinstall_shared::constants::manifest;

    fn config(mode: &str, iface: &str) -> ResolvedConfig {
        let mut cfg = ResolvedConfig::default();
        cfg.os.install.mode = mode.into();
        cfg.os.install.mgmt_interface = iface.into();
        cfg
    }

    #[test]
    fn test_join_args_and_no_manifest() {
        let mut cfg = config("join", "eth1");
        cfg.server_url = "https://10.0.0.1:6443".into();
        cfg.token = "secret".into();

        let target = generate(&cfg);
        assert_eq!(target.k3os.k3s_args, vec!["agent", "--flannel-iface", "eth1"]);
        assert!(target.write_files.is_empty());
        assert_eq!(target.k3os.labels.get(labels::MANAGED).map(String::as_str), Some("true"));
        assert!(!target.k3os.labels.contains_key(labels::ENABLE_LB));
        assert_eq!(target.k3os.server_url, "https://10.0.0.1:6443");
        assert_eq!(target.k3os.token, "secret");
    }

    #[test]
    fn test_join_without_interface() {
        let target = generate(&config("join", ""));
        assert_eq!(target.k3os.k3s_args, vec!["agent"]);
    }

    #[test]
    fn test_create_args_and_manifest() {
        let target = generate(&config("create", ""));
        assert_eq!(
            target.k3os.k3s_args,
            vec!["server", "--cluster-init", "--disable", "local-storage"]
        );
        assert_eq!(target.write_files.len(), 1);
        assert_eq!(target.write_files[0].path, manifest::PATH);
        assert!(target.k3os.labels.contains_key(labels::MANAGED));
        assert!(target.k3os.labels.contains_key(labels::ENABLE_LB));
    }

    #[test]
    fn test_create_with_interface() {
        let target = generate(&config("create", "eth0"));
        assert_eq!(
            target.k3os.k3s_args,
            vec![
                "server",
                "--cluster-init",
                "--disable",
                "local-storage",
                "--flannel-iface",
                "eth0"
            ]
        );
    }

    #[test]
    fn test_install_options_copied() {
        let mut cfg = config("create", "eth0");
        cfg.os.install.device = "/dev/vda".into();
        cfg.os.install.force_efi = true;
        cfg.os.install.tty = "ttyS0".into();
        cfg.os.install.iso_url = "http://mirror/harvester.iso".into();

        let install = generate(&cfg).k3os.install.unwrap();
        assert_eq!(install.device, "/dev/vda");
        assert!(install.force_efi);
        assert_eq!(install.tty, "ttyS0");
        assert_eq!(install.iso_url, "http://mirror/harvester.iso");
        assert!(install.config_url.is_empty());
    }

    #[test]
    fn test_generated_config_does_not_alias_source() {
        let mut cfg = config("create", "");
        cfg.os.ssh_authorized_keys = vec!["key".into()];
        cfg.os.sysctls.insert("kernel.printk".into(), "4 4 1 7".into());

        let mut target = generate(&cfg);
        target.ssh_authorized_keys.push("other".into());
        target.k3os.sysctls.clear();

        assert_eq!(cfg.os.ssh_authorized_keys, vec!["key".to_string()]);
        assert_eq!(cfg.os.sysctls.len(), 1);
    }

    #[test]
    fn test_document_round_trip_keeps_copied_fields() {
        let mut cfg = config("create", "eth0");
        cfg.os.hostname = "node1".into();
        cfg.os.password = "rancher".into();
        cfg.os.ssh_authorized_keys = vec!["ssh-ed25519 AAAA one".into(), "ssh-rsa BBBB two".into()];
        cfg.os.modules = vec!["kvm".into(), "vhost_net".into()];
        cfg.os.ntp_servers = vec!["0.pool.ntp.org".into()];
        cfg.os.dns_nameservers = vec!["8.8.8.8".into(), "1.1.1.1".into()];
        cfg.os.wifi = vec![WifiNetwork { name: "lab".into(), passphrase: "pw".into() }];
        cfg.os.environment.insert("http_proxy".into(), "http://proxy:3128".into());
        cfg.os.environment.insert("NO_PROXY".into(), "localhost".into());
        cfg.os.sysctls.insert("vm.max_map_count".into(), "262144".into());

        let target = generate(&cfg).without_install();
        let yaml = target.to_yaml().unwrap();
        let parsed: TargetConfig = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed, target);
        assert_eq!(parsed.hostname, cfg.os.hostname);
        assert_eq!(parsed.ssh_authorized_keys, cfg.os.ssh_authorized_keys);
        assert_eq!(parsed.k3os.modules, cfg.os.modules);
        assert_eq!(parsed.k3os.dns_nameservers, cfg.os.dns_nameservers);
        assert_eq!(parsed.k3os.environment, cfg.os.environment);
        assert_eq!(parsed.k3os.sysctls, cfg.os.sysctls);
        assert_eq!(parsed.k3os.password, cfg.os.password);
        assert!(parsed.k3os.install.is_none());
    }
}
