//! Boot parameter reader.
//!
//! Scans kernel command line text for `harvester.key1.key2=value` tokens and
//! builds a [`KeyPathStore`] from them.

use std::path::Path;
use std::sync::OnceLock;

use hvinstall_shared::constants::boot;
use hvinstall_shared::errors::{InstallerError, InstallerResult};
use regex::Regex;

use super::store::KeyPathStore;

/// Token grammar: a quoted token, a `key="quoted value"` pair, or a bare token.
const TOKEN_PATTERN: &str = r#"("[^"]+")|([^\s]+=("[^"]+")|([^\s]+))"#;

fn token_regex() -> &'static Regex {
    static TOKENS: OnceLock<Regex> = OnceLock::new();
    TOKENS.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

/// Read boot parameters from the default kernel command line location.
pub fn read_boot_parameters() -> InstallerResult<KeyPathStore> {
    read_boot_parameters_from(Path::new(boot::CMDLINE_PATH))
}

/// Read boot parameters from `path`.
///
/// A missing file is not an error and yields an empty store; any other read
/// failure is propagated.
pub fn read_boot_parameters_from(path: &Path) -> InstallerResult<KeyPathStore> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let store = parse_boot_parameters(&text);
            tracing::debug!(
                path = %path.display(),
                keys = store.len(),
                "Read boot parameters"
            );
            Ok(store)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No boot parameter source, using empty store");
            Ok(KeyPathStore::new())
        }
        Err(e) => Err(InstallerError::SourceRead(format!(
            "failed to read boot parameters from {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Parse kernel command line text.
///
/// Tokens without `=` become flags with value `"true"`. Only tokens under the
/// `harvester` namespace are kept, with the namespace segment stripped.
/// Repeated keys accumulate into a list in the order they appear.
pub fn parse_boot_parameters(text: &str) -> KeyPathStore {
    let mut store = KeyPathStore::new();

    for token in token_regex().find_iter(text) {
        let token = token.as_str();
        let (raw_key, value) = match token.split_once('=') {
            Some((key, value)) => (key, value.trim_matches('"').to_string()),
            None => (token, boot::IMPLICIT_FLAG_VALUE.to_string()),
        };

        let key = raw_key.trim_matches('"');
        let mut segments = key.split('.');
        if segments.next() != Some(boot::NAMESPACE) {
            continue;
        }
        let path: Vec<&str> = segments.collect();
        if path.is_empty() || path.iter().any(|segment| segment.is_empty()) {
            tracing::debug!(token, "Ignoring malformed boot parameter");
            continue;
        }

        store.append(&path, value);
    }

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::StoreValue;

    #[test]
    fn test_parse_namespaced_keys() {
        let store = parse_boot_parameters(
            "BOOT_IMAGE=/vmlinuz console=tty1 harvester.token=abc harvester.os.hostname=node1",
        );

        assert_eq!(store.get_scalar("token"), Some("abc"));
        assert_eq!(store.get_scalar("os.hostname"), Some("node1"));
        assert!(store.get(&["BOOT_IMAGE"]).is_none());
        assert!(store.get(&["console"]).is_none());
    }

    #[test]
    fn test_bare_token_is_true_flag() {
        let store = parse_boot_parameters("quiet harvester.os.install.silent");
        assert_eq!(store.get_scalar("os.install.silent"), Some("true"));
    }

    #[test]
    fn test_quoted_value_keeps_whitespace() {
        let store = parse_boot_parameters(
            r#"harvester.os.ssh_authorized_keys="ssh-ed25519 AAAAC3Nza user@host" ro"#,
        );
        assert_eq!(
            store.get_scalar("os.ssh_authorized_keys"),
            Some("ssh-ed25519 AAAAC3Nza user@host")
        );
    }

    #[test]
    fn test_repeated_keys_accumulate_in_order() {
        let store = parse_boot_parameters("harvester.a=1 harvester.a=2");
        assert_eq!(
            store.get(&["a"]),
            Some(&StoreValue::List(vec!["1".into(), "2".into()]))
        );
    }

    #[test]
    fn test_namespace_must_be_first_segment() {
        let store = parse_boot_parameters("k3os.harvester.token=x harvesterx.token=y");
        assert!(store.is_empty());
    }

    #[test]
    fn test_bare_namespace_is_ignored() {
        let store = parse_boot_parameters("harvester harvester.=x harvester.os..hostname=y");
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_source_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = read_boot_parameters_from(&dir.path().join("cmdline")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_unreadable_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let err = read_boot_parameters_from(dir.path()).unwrap_err();
        assert!(matches!(err, InstallerError::SourceRead(_)));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdline");
        std::fs::write(&path, "harvester.os.install.device=/dev/sda\n").unwrap();

        let store = read_boot_parameters_from(&path).unwrap();
        assert_eq!(store.get_scalar("os.install.device"), Some("/dev/sda"));
    }
}
