//! Key-path store: the intermediate form every raw config source is parsed into.
//!
//! A store maps a key to a scalar, an ordered list of scalars, a nested store,
//! or an ordered list of nested stores (YAML sequences of mappings). Dotted key
//! paths address nested stores one segment at a time.

use std::collections::BTreeMap;

use hvinstall_shared::errors::{InstallerError, InstallerResult};

/// A value held at one key of a [`KeyPathStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreValue {
    Scalar(String),
    /// Multi-valued key, in first-seen-then-appended order.
    List(Vec<String>),
    Nested(KeyPathStore),
    /// Sequence of mappings, in document order.
    Records(Vec<KeyPathStore>),
}

impl StoreValue {
    /// Short description used in mapping errors.
    pub fn shape(&self) -> &'static str {
        match self {
            StoreValue::Scalar(_) => "a single value",
            StoreValue::List(_) => "a list of values",
            StoreValue::Nested(_) => "a nested section",
            StoreValue::Records(_) => "a list of sections",
        }
    }
}

/// Generic nested mapping keyed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPathStore {
    entries: BTreeMap<String, StoreValue>,
}

impl KeyPathStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate the top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StoreValue)> {
        self.entries.iter()
    }

    /// Look up the value at `path`, descending through nested stores.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&StoreValue> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for segment in parents {
            match current.entries.get(segment.as_ref()) {
                Some(StoreValue::Nested(inner)) => current = inner,
                _ => return None,
            }
        }
        current.entries.get(last.as_ref())
    }

    /// Convenience lookup of a scalar at a dotted path.
    pub fn get_scalar(&self, dotted: &str) -> Option<&str> {
        let path: Vec<&str> = dotted.split('.').collect();
        match self.get(&path) {
            Some(StoreValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    /// Store `value` at `path`, replacing whatever was there.
    ///
    /// Missing intermediate sections are created; an intermediate that holds a
    /// non-nested value is replaced by a section.
    pub fn put<S: AsRef<str>>(&mut self, path: &[S], value: StoreValue) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let parent = self.section_mut(parents);
        parent.entries.insert(last.as_ref().to_string(), value);
    }

    /// Add a scalar at `path`, accumulating repeated keys.
    ///
    /// The first value is stored as a scalar; a second value at the same path
    /// promotes it to a list, and later values are appended in order.
    pub fn append<S: AsRef<str>>(&mut self, path: &[S], value: String) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let parent = self.section_mut(parents);
        let key = last.as_ref().to_string();
        let next = match parent.entries.remove(&key) {
            Some(StoreValue::Scalar(existing)) => StoreValue::List(vec![existing, value]),
            Some(StoreValue::List(mut values)) => {
                values.push(value);
                StoreValue::List(values)
            }
            _ => StoreValue::Scalar(value),
        };
        parent.entries.insert(key, next);
    }

    /// Deep-merge `other` over `self`: sections merge recursively, any other
    /// value from `other` replaces the one in `self` (last writer wins).
    pub fn merge(&mut self, other: KeyPathStore) {
        for (key, incoming) in other.entries {
            match (self.entries.get_mut(&key), incoming) {
                (Some(StoreValue::Nested(existing)), StoreValue::Nested(incoming)) => {
                    existing.merge(incoming);
                }
                (_, incoming) => {
                    self.entries.insert(key, incoming);
                }
            }
        }
    }

    /// Return the merge of `self` and `other` without mutating either.
    pub fn merged(mut self, other: KeyPathStore) -> KeyPathStore {
        self.merge(other);
        self
    }

    /// Build a store from a parsed YAML mapping.
    ///
    /// Scalars keep their textual form (`true`, `3`), `null` entries are
    /// dropped, and sequences of mappings become [`StoreValue::Records`].
    pub fn from_yaml(value: &serde_yaml::Value) -> InstallerResult<Self> {
        match value {
            serde_yaml::Value::Mapping(mapping) => Self::from_mapping(mapping, ""),
            serde_yaml::Value::Null => Ok(Self::new()),
            other => Err(InstallerError::SourceRead(format!(
                "expected a YAML mapping at the document root, found {}",
                yaml_kind(other)
            ))),
        }
    }

    /// Parse YAML text into a store.
    pub fn from_yaml_str(text: &str) -> InstallerResult<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| InstallerError::SourceRead(format!("failed to unmarshal yaml: {}", e)))?;
        Self::from_yaml(&value)
    }

    fn from_mapping(mapping: &serde_yaml::Mapping, at: &str) -> InstallerResult<Self> {
        let mut store = Self::new();
        for (key, value) in mapping {
            let key = yaml_scalar(key).ok_or_else(|| {
                InstallerError::SourceRead(format!("non-scalar key in section '{}'", at))
            })?;
            let path = if at.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", at, key)
            };
            if let Some(value) = Self::convert(value, &path)? {
                store.entries.insert(key, value);
            }
        }
        Ok(store)
    }

    fn convert(value: &serde_yaml::Value, path: &str) -> InstallerResult<Option<StoreValue>> {
        use serde_yaml::Value;

        let converted = match value {
            Value::Null => None,
            Value::Mapping(mapping) => Some(StoreValue::Nested(Self::from_mapping(mapping, path)?)),
            Value::Sequence(items) => Some(Self::convert_sequence(items, path)?),
            Value::Tagged(tagged) => Self::convert(&tagged.value, path)?,
            scalar => yaml_scalar(scalar).map(StoreValue::Scalar),
        };
        Ok(converted)
    }

    fn convert_sequence(items: &[serde_yaml::Value], path: &str) -> InstallerResult<StoreValue> {
        use serde_yaml::Value;

        let items: Vec<&Value> = items.iter().filter(|item| !item.is_null()).collect();
        if !items.is_empty() && items.iter().all(|item| item.is_mapping()) {
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                if let Value::Mapping(mapping) = item {
                    records.push(Self::from_mapping(mapping, &format!("{}[{}]", path, index))?);
                }
            }
            return Ok(StoreValue::Records(records));
        }

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let scalar = yaml_scalar(item).ok_or_else(|| {
                InstallerError::SourceRead(format!(
                    "'{}' mixes scalars with {} in one list",
                    path,
                    yaml_kind(item)
                ))
            })?;
            values.push(scalar);
        }
        Ok(StoreValue::List(values))
    }

    fn section_mut<S: AsRef<str>>(&mut self, path: &[S]) -> &mut KeyPathStore {
        let mut current = self;
        for segment in path {
            let entry = current
                .entries
                .entry(segment.as_ref().to_string())
                .or_insert_with(|| StoreValue::Nested(KeyPathStore::new()));
            if !matches!(entry, StoreValue::Nested(_)) {
                *entry = StoreValue::Nested(KeyPathStore::new());
            }
            current = match entry {
                StoreValue::Nested(inner) => inner,
                _ => unreachable!("entry was just replaced by a section"),
            };
        }
        current
    }
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> StoreValue {
        StoreValue::Scalar(s.to_string())
    }

    #[test]
    fn test_put_and_get_nested() {
        let mut store = KeyPathStore::new();
        store.put(&["os", "install", "device"], scalar("/dev/sda"));

        assert_eq!(
            store.get(&["os", "install", "device"]),
            Some(&scalar("/dev/sda"))
        );
        assert_eq!(store.get_scalar("os.install.device"), Some("/dev/sda"));
        assert!(store.get(&["os", "missing"]).is_none());
    }

    #[test]
    fn test_append_promotes_to_list_in_order() {
        let mut store = KeyPathStore::new();
        store.append(&["a"], "1".into());
        store.append(&["a"], "2".into());
        store.append(&["a"], "3".into());

        assert_eq!(
            store.get(&["a"]),
            Some(&StoreValue::List(vec!["1".into(), "2".into(), "3".into()]))
        );
    }

    #[test]
    fn test_put_replaces_scalar_intermediate() {
        let mut store = KeyPathStore::new();
        store.put(&["os"], scalar("flag"));
        store.put(&["os", "hostname"], scalar("node1"));

        assert_eq!(store.get_scalar("os.hostname"), Some("node1"));
    }

    #[test]
    fn test_merge_is_deep_and_last_writer_wins() {
        let mut base = KeyPathStore::new();
        base.put(&["os", "hostname"], scalar("boot"));
        base.put(&["os", "password"], scalar("secret"));
        base.put(&["token"], scalar("t1"));

        let mut over = KeyPathStore::new();
        over.put(&["os", "hostname"], scalar("local"));
        over.put(&["token"], StoreValue::List(vec!["x".into()]));

        base.merge(over);

        assert_eq!(base.get_scalar("os.hostname"), Some("local"));
        assert_eq!(base.get_scalar("os.password"), Some("secret"));
        assert_eq!(
            base.get(&["token"]),
            Some(&StoreValue::List(vec!["x".into()]))
        );
    }

    #[test]
    fn test_from_yaml_converts_scalars_and_records() {
        let store = KeyPathStore::from_yaml_str(
            r#"
token: abc
os:
  hostname: node1
  modules: [kvm, vhost_net]
  install:
    silent: true
    retries: 3
    tty: ~
  wifi:
    - name: home
      passphrase: pw
"#,
        )
        .unwrap();

        assert_eq!(store.get_scalar("token"), Some("abc"));
        assert_eq!(store.get_scalar("os.install.silent"), Some("true"));
        assert_eq!(store.get_scalar("os.install.retries"), Some("3"));
        assert!(store.get(&["os", "install", "tty"]).is_none());
        assert_eq!(
            store.get(&["os", "modules"]),
            Some(&StoreValue::List(vec!["kvm".into(), "vhost_net".into()]))
        );
        match store.get(&["os", "wifi"]) {
            Some(StoreValue::Records(records)) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].get_scalar("name"), Some("home"));
            }
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[test]
    fn test_from_yaml_rejects_non_mapping_root() {
        let err = KeyPathStore::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("expected a YAML mapping"));
    }

    #[test]
    fn test_from_yaml_empty_document_is_empty_store() {
        assert!(KeyPathStore::from_yaml_str("").unwrap().is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_invalid_yaml() {
        let err = KeyPathStore::from_yaml_str("a: [unterminated").unwrap_err();
        assert!(err.to_string().contains("failed to unmarshal yaml"));
    }
}
