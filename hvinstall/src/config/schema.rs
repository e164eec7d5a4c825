//! Config mapper: binds a [`KeyPathStore`] to a [`ResolvedConfig`].
//!
//! Binding is driven by a declarative table of canonical field paths that is
//! indexed once per process and shared read-only afterwards. Incoming keys
//! are matched against the table with fuzzy names (case-insensitive, `_` and
//! `-` ignored), then coerced to the shape of the target field:
//!
//! - a scalar becomes a one-element list for list fields;
//! - truthy strings (`true`, `no`, `1`, ...) become booleans;
//! - nested sections or `key=value` strings become maps;
//! - sequences of sections (or sections whose sub-keys repeat) become records.
//!
//! Keys the table does not know are ignored, so newer boot parameters never
//! break older installers.
//!
//! Before layers are merged, each one is rewritten to the canonical spelling
//! with [`Schema::canonicalize`]; otherwise `serverUrl` and `server_url` would
//! sit side by side and precedence would depend on key order.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use hvinstall_shared::errors::{InstallerError, InstallerResult};

use super::store::{KeyPathStore, StoreValue};
use super::types::{BasicAuth, ResolvedConfig, WebhookDefinition, WifiNetwork};

/// Typed destination of one table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    ServerUrl,
    Token,
    SshAuthorizedKeys,
    Hostname,
    Modules,
    Sysctls,
    NtpServers,
    DnsNameservers,
    Wifi,
    Password,
    Environment,
    Mode,
    MgmtInterface,
    ForceEfi,
    Device,
    Silent,
    PowerOff,
    NoFormat,
    Debug,
    Automatic,
    IsoUrl,
    Tty,
    ConfigUrl,
    Webhooks,
}

/// Shape a value is coerced into before it is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Text,
    Flag,
    TextList,
    TextMap,
    Records,
}

struct FieldSpec {
    path: &'static str,
    field: Field,
    shape: Shape,
}

const fn spec(path: &'static str, field: Field, shape: Shape) -> FieldSpec {
    FieldSpec { path, field, shape }
}

/// The first entry for a field is its canonical spelling; later entries for
/// the same field are aliases.
#[rustfmt::skip]
const FIELDS: &[FieldSpec] = &[
    spec("server_url", Field::ServerUrl, Shape::Text),
    spec("token", Field::Token, Shape::Text),
    spec("os.ssh_authorized_keys", Field::SshAuthorizedKeys, Shape::TextList),
    spec("os.hostname", Field::Hostname, Shape::Text),
    spec("os.modules", Field::Modules, Shape::TextList),
    spec("os.sysctls", Field::Sysctls, Shape::TextMap),
    spec("os.sysctl", Field::Sysctls, Shape::TextMap),
    spec("os.ntp_servers", Field::NtpServers, Shape::TextList),
    spec("os.dns_nameservers", Field::DnsNameservers, Shape::TextList),
    spec("os.wifi", Field::Wifi, Shape::Records),
    spec("os.password", Field::Password, Shape::Text),
    spec("os.environment", Field::Environment, Shape::TextMap),
    spec("os.install.mode", Field::Mode, Shape::Text),
    spec("os.install.mgmt_interface", Field::MgmtInterface, Shape::Text),
    spec("os.install.management_interface", Field::MgmtInterface, Shape::Text),
    spec("os.install.force_efi", Field::ForceEfi, Shape::Flag),
    spec("os.install.device", Field::Device, Shape::Text),
    spec("os.install.silent", Field::Silent, Shape::Flag),
    spec("os.install.power_off", Field::PowerOff, Shape::Flag),
    spec("os.install.no_format", Field::NoFormat, Shape::Flag),
    spec("os.install.debug", Field::Debug, Shape::Flag),
    spec("os.install.automatic", Field::Automatic, Shape::Flag),
    spec("os.install.iso_url", Field::IsoUrl, Shape::Text),
    spec("os.install.tty", Field::Tty, Shape::Text),
    spec("os.install.config_url", Field::ConfigUrl, Shape::Text),
    spec("os.install.webhooks", Field::Webhooks, Shape::Records),
    spec("automatic", Field::Automatic, Shape::Flag),
];

/// Normalize a key for fuzzy matching: lower-case, separators removed.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_path(path: &str) -> String {
    path.split('.')
        .map(normalize_name)
        .collect::<Vec<_>>()
        .join(".")
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Index of the field table, keyed by normalized dotted path.
pub struct Schema {
    fields: HashMap<String, &'static FieldSpec>,
    /// Normalized section path to its canonical segments.
    sections: HashMap<String, Vec<&'static str>>,
    /// Canonical segments of each field.
    canonical: HashMap<Field, Vec<&'static str>>,
}

impl Schema {
    /// The process-wide schema, built on first use.
    pub fn global() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| Schema::build(FIELDS))
    }

    fn build(table: &'static [FieldSpec]) -> Schema {
        let mut fields = HashMap::with_capacity(table.len());
        let mut sections = HashMap::new();
        let mut canonical = HashMap::new();
        for entry in table {
            let segments: Vec<&'static str> = entry.path.split('.').collect();
            let mut parent = String::new();
            for depth in 1..segments.len() {
                parent = join(&parent, &normalize_name(segments[depth - 1]));
                sections
                    .entry(parent.clone())
                    .or_insert_with(|| segments[..depth].to_vec());
            }
            canonical.entry(entry.field).or_insert(segments);
            fields.insert(normalize_path(entry.path), entry);
        }
        Schema {
            fields,
            sections,
            canonical,
        }
    }

    /// Whether `dotted` (in any spelling) names a known field.
    pub fn knows(&self, dotted: &str) -> bool {
        self.fields.contains_key(&normalize_path(dotted))
    }

    /// Rewrite known keys of `store` to their canonical spelling and place.
    ///
    /// Aliases move to the canonical path of their field and sections spelled
    /// differently are folded together. Field values are kept as they are, and
    /// unknown keys stay where they were found.
    pub fn canonicalize(&self, store: &KeyPathStore) -> KeyPathStore {
        let mut out = KeyPathStore::new();
        self.canonicalize_into(store, "", &[], &mut out);
        out
    }

    fn canonicalize_into(
        &self,
        store: &KeyPathStore,
        prefix: &str,
        placed: &[&str],
        out: &mut KeyPathStore,
    ) {
        for (key, value) in store.iter() {
            let path = join(prefix, &normalize_name(key));

            if let Some(entry) = self.fields.get(&path) {
                out.put(&self.canonical[&entry.field][..], value.clone());
            } else if let StoreValue::Nested(inner) = value
                && let Some(section) = self.sections.get(&path)
            {
                self.canonicalize_into(inner, &path, section, out);
            } else {
                let mut at = placed.to_vec();
                at.push(key.as_str());
                out.put(&at[..], value.clone());
            }
        }
    }

    /// Read the scalar at a known field path, whatever its spelling in `store`.
    ///
    /// Only that field is looked at, so a bad value elsewhere in the store
    /// does not get in the way.
    pub fn get_scalar(&self, store: &KeyPathStore, dotted: &str) -> Option<String> {
        let entry = self.fields.get(&normalize_path(dotted))?;
        let canonical = self.canonicalize(store);
        match canonical.get(&self.canonical[&entry.field][..]) {
            Some(StoreValue::Scalar(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Bind `store` to a typed config.
    ///
    /// Every offending key is reported; the failures are returned together as
    /// one [`InstallerError::Mapping`].
    pub fn map(&self, store: &KeyPathStore) -> InstallerResult<ResolvedConfig> {
        let mut cfg = ResolvedConfig::default();
        let mut failures = Vec::new();
        self.walk(store, "", "", &mut cfg, &mut failures);

        if failures.is_empty() {
            Ok(cfg)
        } else {
            Err(InstallerError::Mapping(failures.join("; ")))
        }
    }

    fn walk(
        &self,
        store: &KeyPathStore,
        prefix: &str,
        shown_prefix: &str,
        cfg: &mut ResolvedConfig,
        failures: &mut Vec<String>,
    ) {
        for (key, value) in store.iter() {
            let path = join(prefix, &normalize_name(key));
            let shown = join(shown_prefix, key);

            if let Some(entry) = self.fields.get(&path) {
                if let Err(reason) = assign(cfg, entry, value, &shown) {
                    failures.push(format!("{}: {}", shown, reason));
                }
            } else if let StoreValue::Nested(inner) = value
                && self.sections.contains_key(&path)
            {
                self.walk(inner, &path, &shown, cfg, failures);
            } else {
                tracing::trace!(key = %shown, "Ignoring unknown config key");
            }
        }
    }
}

/// Map a store with the process-wide schema.
pub fn map_store(store: &KeyPathStore) -> InstallerResult<ResolvedConfig> {
    Schema::global().map(store)
}

fn assign(
    cfg: &mut ResolvedConfig,
    entry: &FieldSpec,
    value: &StoreValue,
    shown: &str,
) -> Result<(), String> {
    let os = &mut cfg.os;
    let install = &mut os.install;

    match entry.shape {
        Shape::Text => {
            let text = to_text(value)?;
            match entry.field {
                Field::ServerUrl => cfg.server_url = text,
                Field::Token => cfg.token = text,
                Field::Hostname => os.hostname = text,
                Field::Password => os.password = text,
                Field::Mode => install.mode = text,
                Field::MgmtInterface => install.mgmt_interface = text,
                Field::Device => install.device = text,
                Field::IsoUrl => install.iso_url = text,
                Field::Tty => install.tty = text,
                Field::ConfigUrl => install.config_url = text,
                other => return Err(format!("{:?} is not a text field", other)),
            }
        }
        Shape::Flag => {
            let flag = to_flag(value)?;
            match entry.field {
                Field::ForceEfi => install.force_efi = flag,
                Field::Silent => install.silent = flag,
                Field::PowerOff => install.power_off = flag,
                Field::NoFormat => install.no_format = flag,
                Field::Debug => install.debug = flag,
                Field::Automatic => install.automatic = flag,
                other => return Err(format!("{:?} is not a boolean field", other)),
            }
        }
        Shape::TextList => {
            let list = to_list(value)?;
            match entry.field {
                Field::SshAuthorizedKeys => os.ssh_authorized_keys = list,
                Field::Modules => os.modules = list,
                Field::NtpServers => os.ntp_servers = list,
                Field::DnsNameservers => os.dns_nameservers = list,
                other => return Err(format!("{:?} is not a list field", other)),
            }
        }
        Shape::TextMap => {
            let map = to_map(value)?;
            match entry.field {
                Field::Sysctls => os.sysctls = map,
                Field::Environment => os.environment = map,
                other => return Err(format!("{:?} is not a map field", other)),
            }
        }
        Shape::Records => {
            let records = to_records(value)?;
            match entry.field {
                Field::Wifi => {
                    os.wifi = map_records(&records, shown, wifi_from_record)?;
                }
                Field::Webhooks => {
                    install.webhooks = map_records(&records, shown, webhook_from_record)?;
                }
                other => return Err(format!("{:?} is not a record field", other)),
            }
        }
    }
    Ok(())
}

/// Parse a truthy string.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" | "y" => Some(true),
        "false" | "no" | "off" | "0" | "n" | "" => Some(false),
        _ => None,
    }
}

fn to_text(value: &StoreValue) -> Result<String, String> {
    match value {
        StoreValue::Scalar(text) => Ok(text.clone()),
        other => Err(format!("expected a single value, found {}", other.shape())),
    }
}

fn to_flag(value: &StoreValue) -> Result<bool, String> {
    match value {
        StoreValue::Scalar(text) => {
            parse_bool(text).ok_or_else(|| format!("cannot convert {:?} to a boolean", text))
        }
        other => Err(format!("expected a boolean, found {}", other.shape())),
    }
}

fn to_list(value: &StoreValue) -> Result<Vec<String>, String> {
    match value {
        StoreValue::Scalar(text) => Ok(vec![text.clone()]),
        StoreValue::List(items) => Ok(items.clone()),
        other => Err(format!("expected a list of values, found {}", other.shape())),
    }
}

fn to_map(value: &StoreValue) -> Result<BTreeMap<String, String>, String> {
    let mut map = BTreeMap::new();
    match value {
        StoreValue::Nested(inner) => flatten_into(inner, "", &mut map)?,
        StoreValue::Scalar(text) => insert_pair(text, &mut map)?,
        StoreValue::List(items) => {
            for item in items {
                insert_pair(item, &mut map)?;
            }
        }
        StoreValue::Records(_) => {
            return Err(format!("expected a mapping, found {}", value.shape()));
        }
    }
    Ok(map)
}

/// Nested map keys keep their original spelling and are joined with dots,
/// so `kernel: {printk: 4}` yields `kernel.printk`.
fn flatten_into(
    store: &KeyPathStore,
    prefix: &str,
    map: &mut BTreeMap<String, String>,
) -> Result<(), String> {
    for (key, value) in store.iter() {
        let key = join(prefix, key);
        match value {
            StoreValue::Scalar(text) => {
                map.insert(key, text.clone());
            }
            StoreValue::Nested(inner) => flatten_into(inner, &key, map)?,
            other => return Err(format!("'{}' must be a single value, found {}", key, other.shape())),
        }
    }
    Ok(())
}

fn insert_pair(text: &str, map: &mut BTreeMap<String, String>) -> Result<(), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, found {:?}", text))?;
    map.insert(key.to_string(), value.to_string());
    Ok(())
}

fn to_records(value: &StoreValue) -> Result<Vec<KeyPathStore>, String> {
    match value {
        StoreValue::Records(records) => Ok(records.clone()),
        StoreValue::Nested(inner) => Ok(zip_records(inner)),
        other => Err(format!("expected a list of sections, found {}", other.shape())),
    }
}

/// Split a section whose sub-keys repeat into one record per position.
///
/// `{name: [a, b], passphrase: [x, y]}` becomes `[{name: a, passphrase: x},
/// {name: b, passphrase: y}]`; a section of plain scalars is one record.
fn zip_records(section: &KeyPathStore) -> Vec<KeyPathStore> {
    let count = section
        .iter()
        .map(|(_, value)| match value {
            StoreValue::List(items) => items.len(),
            _ => 1,
        })
        .max()
        .unwrap_or(0);

    (0..count)
        .map(|index| {
            let mut record = KeyPathStore::new();
            for (key, value) in section.iter() {
                match value {
                    StoreValue::List(items) => {
                        if let Some(item) = items.get(index) {
                            record.put(&[key], StoreValue::Scalar(item.clone()));
                        }
                    }
                    StoreValue::Scalar(_) if index > 0 => {}
                    other => record.put(&[key], other.clone()),
                }
            }
            record
        })
        .collect()
}

fn map_records<T>(
    records: &[KeyPathStore],
    shown: &str,
    convert: fn(&KeyPathStore, &str) -> Result<T, String>,
) -> Result<Vec<T>, String> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| convert(record, &format!("{}[{}]", shown, index)))
        .collect()
}

fn wifi_from_record(record: &KeyPathStore, shown: &str) -> Result<WifiNetwork, String> {
    let mut wifi = WifiNetwork::default();
    for (key, value) in record.iter() {
        let at = |reason: String| format!("{}.{}: {}", shown, key, reason);
        match normalize_name(key).as_str() {
            "name" | "ssid" => wifi.name = to_text(value).map_err(at)?,
            "passphrase" | "password" => wifi.passphrase = to_text(value).map_err(at)?,
            _ => {}
        }
    }
    Ok(wifi)
}

fn webhook_from_record(record: &KeyPathStore, shown: &str) -> Result<WebhookDefinition, String> {
    let mut hook = WebhookDefinition::default();
    for (key, value) in record.iter() {
        let at = |reason: String| format!("{}.{}: {}", shown, key, reason);
        match normalize_name(key).as_str() {
            "event" => hook.event = to_text(value).map_err(at)?,
            "method" => hook.method = to_text(value).map_err(at)?,
            "url" => hook.url = to_text(value).map_err(at)?,
            "payload" => hook.payload = to_text(value).map_err(at)?,
            "insecure" => hook.insecure = to_flag(value).map_err(at)?,
            "headers" => hook.headers = to_headers(value).map_err(at)?,
            "basicauth" => hook.basic_auth = to_basic_auth(value).map_err(at)?,
            _ => {}
        }
    }
    Ok(hook)
}

/// Header names keep their spelling; each value may be one string or a list.
fn to_headers(value: &StoreValue) -> Result<BTreeMap<String, Vec<String>>, String> {
    let StoreValue::Nested(section) = value else {
        return Err(format!("expected a mapping of headers, found {}", value.shape()));
    };
    let mut headers = BTreeMap::new();
    for (name, values) in section.iter() {
        let values = to_list(values).map_err(|reason| format!("header '{}': {}", name, reason))?;
        headers.insert(name.clone(), values);
    }
    Ok(headers)
}

fn to_basic_auth(value: &StoreValue) -> Result<BasicAuth, String> {
    let StoreValue::Nested(section) = value else {
        return Err(format!("expected a user/password section, found {}", value.shape()));
    };
    let mut auth = BasicAuth::default();
    for (key, value) in section.iter() {
        match normalize_name(key).as_str() {
            "user" | "username" => auth.user = to_text(value)?,
            "password" => auth.password = to_text(value)?,
            _ => {}
        }
    }
    Ok(auth)
}
