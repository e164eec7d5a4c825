//! Live host state consulted by validation.
//!
//! Validation reads the host's network interfaces and installable disks. Both
//! sit behind [`HostProbe`] so rules can be checked against fixed fixtures.

use std::process::Command;

use hvinstall_shared::errors::{InstallerError, InstallerResult};

/// One network interface of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub loopback: bool,
}

/// One installable disk, as offered to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskOption {
    /// Device path, e.g. `/dev/sda`.
    pub value: String,
    /// Display text, e.g. `sda 120G`.
    pub label: String,
}

/// Source of host facts.
pub trait HostProbe: Send + Sync {
    fn interfaces(&self) -> InstallerResult<Vec<NetworkInterface>>;

    fn disk_options(&self) -> InstallerResult<Vec<DiskOption>>;
}

/// Reads facts from the running system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostProbe for SystemHost {
    #[cfg(unix)]
    fn interfaces(&self) -> InstallerResult<Vec<NetworkInterface>> {
        use nix::ifaddrs::getifaddrs;
        use nix::net::if_::InterfaceFlags;

        let addrs = getifaddrs().map_err(|e| {
            InstallerError::Internal(format!("Failed to list network interfaces: {}", e))
        })?;

        let mut interfaces: Vec<NetworkInterface> = Vec::new();
        for addr in addrs {
            if interfaces.iter().any(|i| i.name == addr.interface_name) {
                continue;
            }
            interfaces.push(NetworkInterface {
                loopback: addr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
                name: addr.interface_name,
            });
        }
        Ok(interfaces)
    }

    #[cfg(not(unix))]
    fn interfaces(&self) -> InstallerResult<Vec<NetworkInterface>> {
        Err(InstallerError::Internal(
            "Listing network interfaces is only supported on Unix".into(),
        ))
    }

    fn disk_options(&self) -> InstallerResult<Vec<DiskOption>> {
        let output = Command::new("lsblk")
            .args(["-r", "-n", "-d", "-o", "NAME,SIZE,TYPE"])
            .output()
            .map_err(|e| InstallerError::Internal(format!("Failed to run lsblk: {}", e)))?;

        if !output.status.success() {
            return Err(InstallerError::Internal(format!(
                "lsblk exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(parse_lsblk(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse raw `lsblk -r -o NAME,SIZE,TYPE` output, keeping whole disks only.
pub fn parse_lsblk(output: &str) -> Vec<DiskOption> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, size, "disk"] => Some(DiskOption {
                    value: format!("/dev/{}", name),
                    label: format!("{} {}", name, size),
                }),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lsblk_keeps_disks() {
        let output = "sda 120G disk\nsr0 1024M rom\nloop0 55M loop\nnvme0n1 1T disk\n";
        let disks = parse_lsblk(output);
        assert_eq!(
            disks,
            vec![
                DiskOption { value: "/dev/sda".into(), label: "sda 120G".into() },
                DiskOption { value: "/dev/nvme0n1".into(), label: "nvme0n1 1T".into() },
            ]
        );
    }

    #[test]
    fn test_parse_lsblk_empty() {
        assert!(parse_lsblk("").is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_system_host_has_loopback() {
        let interfaces = SystemHost.interfaces().unwrap();
        assert!(interfaces.iter().any(|i| i.loopback));
    }
}
