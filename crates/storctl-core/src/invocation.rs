// ── Module invocation contract ──
//
// A module is invoked with a JSON argument document and answers with a
// JSON result document. Internal `_ansible_*` keys carry execution
// flags (check mode) and are stripped before parameter parsing; every
// other key must be a parameter the module declares.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::CoreError;

const WRAPPER_KEY: &str = "ANSIBLE_MODULE_ARGS";
const INTERNAL_PREFIX: &str = "_ansible_";
const CHECK_MODE_KEY: &str = "_ansible_check_mode";

/// Parsed argument document for a single module execution.
#[derive(Debug, Clone, Default)]
pub struct ModuleInvocation {
    args: Map<String, Value>,
    check_mode: bool,
}

impl ModuleInvocation {
    /// Build an invocation from already-separated parameters.
    pub fn new(args: Map<String, Value>, check_mode: bool) -> Self {
        Self { args, check_mode }
    }

    /// Parse an argument document.
    ///
    /// Accepts both the flat form (`{"name": ..., "_ansible_check_mode": true}`)
    /// and the wrapped form (`{"ANSIBLE_MODULE_ARGS": {...}}`).
    pub fn from_json_str(document: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| CoreError::validation(format!("invalid argument document: {e}")))?;
        let Value::Object(mut root) = value else {
            return Err(CoreError::validation(
                "argument document must be a JSON object",
            ));
        };

        if let Some(inner) = root.remove(WRAPPER_KEY) {
            let Value::Object(inner) = inner else {
                return Err(CoreError::validation(format!(
                    "{WRAPPER_KEY} must be a JSON object"
                )));
            };
            root = inner;
        }

        let check_mode = root
            .get(CHECK_MODE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        root.retain(|key, _| !key.starts_with(INTERNAL_PREFIX));

        Ok(Self {
            args: root,
            check_mode,
        })
    }

    pub fn check_mode(&self) -> bool {
        self.check_mode
    }

    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }

    /// A string-valued parameter, if set.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    /// Validate parameter names and deserialize into the module's
    /// parameter struct.
    ///
    /// `null` values are treated as unset so defaults apply.
    pub fn parse<P: DeserializeOwned>(&self, module: &str, supported: &[&str]) -> Result<P, CoreError> {
        let mut unsupported: Vec<&str> = self
            .args
            .keys()
            .map(String::as_str)
            .filter(|key| !supported.contains(key))
            .collect();
        if !unsupported.is_empty() {
            unsupported.sort_unstable();
            let mut names: Vec<&str> = supported.to_vec();
            names.sort_unstable();
            return Err(CoreError::validation(format!(
                "Unsupported parameters for ({module}) module: {}. Supported parameters include: {}",
                unsupported.join(", "),
                names.join(", ")
            )));
        }

        let args: Map<String, Value> = self
            .args
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        serde_json::from_value(Value::Object(args)).map_err(|e| describe_parse_error(module, &e))
    }
}

fn describe_parse_error(module: &str, err: &serde_json::Error) -> CoreError {
    let text = err.to_string();
    if let Some(rest) = text.strip_prefix("missing field `") {
        let field = rest.split('`').next().unwrap_or(rest);
        return CoreError::validation(format!("missing required arguments: {field}"));
    }
    CoreError::validation(format!("invalid parameters for ({module}) module: {text}"))
}

/// The result document for a failed execution.
pub fn failure_document(err: &CoreError) -> Value {
    json!({
        "changed": false,
        "failed": true,
        "msg": err.to_string(),
    })
}

// ── Lenient scalar coercion ─────────────────────────────────────────

/// Deserializers that accept the loose scalar forms playbooks produce:
/// numbers where strings are declared, `"yes"`/`"no"` booleans, and
/// comma-separated lists.
pub mod de {
    use secrecy::SecretString;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_to_string(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(if b { "True".into() } else { "False".into() }),
            _ => None,
        }
    }

    pub(crate) fn parse_bool(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "yes" | "on" | "1" | "true" | "y" | "t" => Some(true),
                "no" | "off" | "0" | "false" | "n" | "f" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let value = Value::deserialize(d)?;
        scalar_to_string(value).ok_or_else(|| D::Error::custom("expected a string"))
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        string(d).map(Some)
    }

    pub fn secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
        string(d).map(SecretString::from)
    }

    pub fn opt_secret<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SecretString>, D::Error> {
        secret(d).map(Some)
    }

    pub fn bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let value = Value::deserialize(d)?;
        parse_bool(&value)
            .ok_or_else(|| D::Error::custom(format!("{value} is not a valid boolean")))
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        bool(d).map(Some)
    }

    pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let value = Value::deserialize(d)?;
        let parsed = match &value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("{value} is not a valid integer")))
    }

    pub fn opt_u16<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u16>, D::Error> {
        let value = opt_u32(d)?;
        value
            .map(u16::try_from)
            .transpose()
            .map_err(|_| D::Error::custom("port out of range"))
    }

    /// A list of strings, or a single comma-separated string.
    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| D::Error::custom("list items must be strings"))
                })
                .collect(),
            Value::String(s) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()),
            other => Err(D::Error::custom(format!("{other} is not a valid list"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        #[serde(default, deserialize_with = "de::opt_bool")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "de::opt_string")]
        port: Option<String>,
        #[serde(default, deserialize_with = "de::string_list")]
        members: Vec<String>,
    }

    const SAMPLE_PARAMS: &[&str] = &["name", "flag", "port", "members"];

    #[test]
    fn wrapped_document_with_check_mode() {
        let inv = ModuleInvocation::from_json_str(
            r#"{"ANSIBLE_MODULE_ARGS": {"name": "x", "_ansible_check_mode": true, "_ansible_debug": false}}"#,
        )
        .unwrap();
        assert!(inv.check_mode());
        assert_eq!(inv.args().len(), 1);
    }

    #[test]
    fn nulls_are_unset_and_scalars_coerced() {
        let inv = ModuleInvocation::from_json_str(
            r#"{"name": "x", "flag": "yes", "port": 1, "members": "a, b,,c"}"#,
        )
        .unwrap();
        let sample: Sample = inv.parse("sample", SAMPLE_PARAMS).unwrap();
        assert_eq!(sample.name, "x");
        assert_eq!(sample.flag, Some(true));
        assert_eq!(sample.port.as_deref(), Some("1"));
        assert_eq!(sample.members, vec!["a", "b", "c"]);

        let inv = ModuleInvocation::from_json_str(r#"{"name": "x", "flag": null}"#).unwrap();
        let sample: Sample = inv.parse("sample", SAMPLE_PARAMS).unwrap();
        assert_eq!(sample.flag, None);
    }

    #[test]
    fn unsupported_parameters_are_rejected() {
        let inv = ModuleInvocation::from_json_str(r#"{"name": "x", "bogus": 1}"#).unwrap();
        let err = inv.parse::<Sample>("sample", SAMPLE_PARAMS).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Unsupported parameters for (sample) module: bogus"));
    }

    #[test]
    fn missing_required_field_message() {
        let inv = ModuleInvocation::from_json_str("{}").unwrap();
        let err = inv.parse::<Sample>("sample", SAMPLE_PARAMS).unwrap_err();
        assert_eq!(err.to_string(), "missing required arguments: name");
    }

    #[test]
    fn failure_document_shape() {
        let doc = failure_document(&CoreError::validation("boom"));
        assert_eq!(doc, json!({"changed": false, "failed": true, "msg": "boom"}));
    }
}
