use std::path::{Path, PathBuf};

use hvinstall::ResolvedConfig;

/// A create-mode config that passes validation on [`crate::StaticHost`].
pub fn valid_create_config() -> ResolvedConfig {
    let mut cfg = ResolvedConfig::default();
    cfg.os.hostname = "node1".into();
    cfg.os.password = "rancher".into();
    cfg.os.install.mode = "create".into();
    cfg.os.install.mgmt_interface = "eth0".into();
    cfg.os.install.device = "/dev/sda".into();
    cfg
}

/// A join-mode config that passes validation on [`crate::StaticHost`].
pub fn valid_join_config() -> ResolvedConfig {
    let mut cfg = valid_create_config();
    cfg.os.install.mode = "join".into();
    cfg.server_url = "https://10.0.0.1:6443".into();
    cfg.token = "token".into();
    cfg
}

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");
    path
}

/// Write a kernel command line file into `dir`.
pub fn write_cmdline(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("cmdline");
    std::fs::write(&path, text).expect("write cmdline");
    path
}
