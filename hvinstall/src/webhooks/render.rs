//! Go-style text templates over a flat string context.

use std::collections::HashMap;
use std::sync::OnceLock;

use gtmpl_value::Value;
use regex::Regex;

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{-?(.*?)-?\}\}").expect("valid action regex"))
}

fn field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[\s(|])\.([A-Za-z_][A-Za-z0-9_]*)").expect("valid field regex")
    })
}

/// Render `template` against `context`.
///
/// Referencing a key that is not in `context` is an error rather than an
/// empty substitution.
pub fn render_template(
    template: &str,
    context: &HashMap<String, String>,
) -> Result<String, String> {
    if !template.contains("{{") {
        return Ok(template.to_string());
    }

    for action in action_regex().captures_iter(template) {
        for field in field_regex().captures_iter(&action[1]) {
            let key = &field[1];
            if !context.contains_key(key) {
                return Err(format!("map has no entry for key {:?}", key));
            }
        }
    }

    let data = Value::Map(
        context
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    );
    gtmpl::template(template, data).map_err(|e| e.to_string())
}
