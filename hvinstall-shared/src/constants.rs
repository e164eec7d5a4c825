//! Constants shared between the installer library, CLI and tests.
//!
//! These values are part of the contract with the boot loader, the target
//! platform and the install binary, so they are not configurable.

/// Boot parameter handling.
pub mod boot {
    /// Only kernel command line tokens under this namespace are consumed.
    pub const NAMESPACE: &str = "harvester";

    /// Default location of the kernel command line.
    pub const CMDLINE_PATH: &str = "/proc/cmdline";

    /// Value given to bare tokens (`harvester.os.install.silent`).
    pub const IMPLICIT_FLAG_VALUE: &str = "true";
}

/// Install modes.
pub mod modes {
    /// Initialize a new cluster.
    pub const CREATE: &str = "create";

    /// Attach to an existing cluster via server URL and token.
    pub const JOIN: &str = "join";
}

/// Labels attached to every generated node configuration.
pub mod labels {
    /// Marks the node as managed by the installer's platform.
    pub const MANAGED: &str = "harvester.cattle.io/managed";

    /// Enables the built-in service load balancer (create mode only).
    pub const ENABLE_LB: &str = "svccontroller.k3s.cattle.io/enablelb";
}

/// Orchestration (k3s) arguments.
pub mod k3s_args {
    pub const AGENT: &str = "agent";
    pub const SERVER: &str = "server";
    pub const CLUSTER_INIT: &str = "--cluster-init";
    pub const DISABLE: &str = "--disable";
    pub const LOCAL_STORAGE: &str = "local-storage";
    pub const FLANNEL_IFACE: &str = "--flannel-iface";
}

/// The generated platform manifest.
pub mod manifest {
    pub const PATH: &str = "/var/lib/rancher/k3s/server/manifests/harvester.yaml";
    pub const OWNER: &str = "root";
    pub const PERMISSIONS: &str = "0600";
}

/// Install process invocation.
pub mod install {
    /// Default path of the external install binary.
    pub const BINARY: &str = "/usr/libexec/k3os/install";

    /// Default directory for the generated config temp file.
    pub const TEMP_DIR: &str = "/tmp";

    /// Prefix of the generated config temp file.
    pub const TEMP_PREFIX: &str = "k3os.";
}

/// HTTP defaults.
pub mod http {
    /// Timeout for remote config fetches and webhook deliveries, in seconds.
    pub const TIMEOUT_SECS: u64 = 15;

    /// Port appended to bare server addresses.
    pub const SERVER_PORT: &str = "6443";

    /// Port of the management endpoint derived from a K3S_URL.
    pub const MANAGEMENT_PORT: &str = "8443";
}
