//! Platform manifest written onto new clusters.

use hvinstall_shared::constants::manifest;

use super::types::WriteFile;

/// Chart values baked into the manifest. Fixed per release, not user input.
pub const CHART_VALUES: &[(&str, &str)] = &[
    ("minio.persistence.storageClass", "longhorn"),
    ("containers.apiserver.image.imagePullPolicy", "IfNotPresent"),
    ("harvester-network-controller.image.pullPolicy", "IfNotPresent"),
    ("service.harvester.type", "LoadBalancer"),
    ("containers.apiserver.authMode", "localUser"),
    ("multus.enabled", "true"),
    ("longhorn.enabled", "true"),
];

const MANIFEST_HEADER: &str = "\
apiVersion: v1
kind: Namespace
metadata:
  name: harvester-system
---
apiVersion: helm.cattle.io/v1
kind: HelmChart
metadata:
  name: harvester
  namespace: kube-system
spec:
  chart: https://%{KUBERNETES_API}%/static/charts/harvester-0.1.0.tgz
  targetNamespace: harvester-system
  set:
";

/// Render the manifest with `values` under `spec.set`, in the given order.
pub fn manifest_content(values: &[(&str, &str)]) -> String {
    let mut content = String::from(MANIFEST_HEADER);
    for (key, value) in values {
        content.push_str(&format!("    {}: {:?}\n", key, value));
    }
    content
}

/// The write-file entry carrying the manifest.
pub fn manifest_file() -> WriteFile {
    WriteFile {
        encoding: String::new(),
        content: manifest_content(CHART_VALUES),
        owner: manifest::OWNER.to_string(),
        path: manifest::PATH.to_string(),
        permissions: manifest::PERMISSIONS.to_string(),
    }
}
