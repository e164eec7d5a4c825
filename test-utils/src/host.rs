use hvinstall::validation::{DiskOption, HostProbe, NetworkInterface};
use hvinstall_shared::errors::InstallerResult;

/// Host with a fixed set of interfaces and disks.
#[derive(Debug, Clone)]
pub struct StaticHost {
    pub interfaces: Vec<NetworkInterface>,
    pub disks: Vec<DiskOption>,
}

impl Default for StaticHost {
    /// `lo` (loopback), `eth0`, `eth1` and one disk, `/dev/sda`.
    fn default() -> Self {
        Self {
            interfaces: vec![
                NetworkInterface {
                    name: "lo".into(),
                    loopback: true,
                },
                NetworkInterface {
                    name: "eth0".into(),
                    loopback: false,
                },
                NetworkInterface {
                    name: "eth1".into(),
                    loopback: false,
                },
            ],
            disks: vec![DiskOption {
                value: "/dev/sda".into(),
                label: "sda 100G".into(),
            }],
        }
    }
}

impl HostProbe for StaticHost {
    fn interfaces(&self) -> InstallerResult<Vec<NetworkInterface>> {
        Ok(self.interfaces.clone())
    }

    fn disk_options(&self) -> InstallerResult<Vec<DiskOption>> {
        Ok(self.disks.clone())
    }
}
