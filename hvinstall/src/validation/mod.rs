//! Install-mode specific validation of a resolved configuration.
//!
//! Rules run in a fixed order and the first violation wins:
//! 1. mode and its server URL / token requirements
//! 2. at least one of SSH keys or password
//! 3. management interface exists and is not loopback
//! 4. device is one of the installable disks

mod host;

pub use host::{DiskOption, HostProbe, NetworkInterface, SystemHost, parse_lsblk};

use hvinstall_shared::constants::modes;
use hvinstall_shared::errors::{InstallerError, InstallerResult};

use crate::config::ResolvedConfig;

/// Validate `cfg` against the host described by `host`.
pub fn validate(cfg: &ResolvedConfig, host: &dyn HostProbe) -> InstallerResult<()> {
    tracing::info!(
        mode = %cfg.os.install.mode,
        device = %cfg.os.install.device,
        mgmt_interface = %cfg.os.install.mgmt_interface,
        "Validating config"
    );

    validate_mode(cfg)?;
    validate_login(cfg)?;
    validate_mgmt_interface(&cfg.os.install.mgmt_interface, host)?;
    validate_device(&cfg.os.install.device, host)?;
    Ok(())
}

fn validate_mode(cfg: &ResolvedConfig) -> InstallerResult<()> {
    let mode = cfg.os.install.mode.as_str();
    match mode {
        modes::CREATE => {
            if !cfg.server_url.is_empty() {
                return Err(InstallerError::Validation(format!(
                    "ServerURL need to be empty in {:?} mode",
                    mode
                )));
            }
        }
        modes::JOIN => {
            if cfg.server_url.is_empty() {
                return Err(InstallerError::Validation(format!(
                    "ServerURL can't be empty in {:?} mode",
                    mode
                )));
            }
            if cfg.token.is_empty() {
                return Err(InstallerError::Validation(format!(
                    "Token can't be empty in {:?} mode",
                    mode
                )));
            }
        }
        other => {
            return Err(InstallerError::Validation(format!(
                "Install.Mode must be {:?} or {:?}, got {:?}",
                modes::CREATE,
                modes::JOIN,
                other
            )));
        }
    }
    Ok(())
}

fn validate_login(cfg: &ResolvedConfig) -> InstallerResult<()> {
    if cfg.os.ssh_authorized_keys.is_empty() && cfg.os.password.is_empty() {
        return Err(InstallerError::Validation(
            "No SSH keys or password are set".to_string(),
        ));
    }
    Ok(())
}

fn validate_mgmt_interface(name: &str, host: &dyn HostProbe) -> InstallerResult<()> {
    if name.is_empty() {
        return Err(InstallerError::Validation(
            "no management interface specified".to_string(),
        ));
    }
    let interface = host
        .interfaces()?
        .into_iter()
        .find(|interface| interface.name == name)
        .ok_or_else(|| {
            InstallerError::Validation(format!("interface {:?} is not found", name))
        })?;
    if interface.loopback {
        return Err(InstallerError::Validation(format!(
            "interface {:?} is a loopback interface",
            name
        )));
    }
    Ok(())
}

fn validate_device(device: &str, host: &dyn HostProbe) -> InstallerResult<()> {
    if device.is_empty() {
        return Err(InstallerError::Validation("no device specified".to_string()));
    }
    if host
        .disk_options()?
        .iter()
        .any(|option| option.value == device)
    {
        Ok(())
    } else {
        Err(InstallerError::Validation(format!(
            "device {:?} not found",
            device
        )))
    }
}
