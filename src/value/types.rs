//! Value tree and scalar kinds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Flat property set: dotted path → scalar.
pub type FlatDict = BTreeMap<String, Scalar>;

/// The nine primitive kinds a property may hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    String(String),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Byte(i8),
    Short(i16),
    Character(char),
    Boolean(bool),
}

impl Scalar {
    /// Borrow the string payload, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(v) => f.write_str(v),
            Scalar::Integer(v) => write!(f, "{}", v),
            Scalar::Long(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Double(v) => write!(f, "{}", v),
            Scalar::Byte(v) => write!(f, "{}", v),
            Scalar::Short(v) => write!(f, "{}", v),
            Scalar::Character(v) => write!(f, "{}", v),
            Scalar::Boolean(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Integer(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Long(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Double(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

/// A decoded configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Scalar(Scalar),
    Sequence(Vec<ConfigValue>),
    Mapping(BTreeMap<String, ConfigValue>),
    /// Explicit JSON `null`.
    Null,
    /// A number none of the scalar kinds can hold (integers above `i64::MAX`).
    Unsupported(serde_json::Number),
}

impl ConfigValue {
    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Scalar(_) => "scalar",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Mapping(_) => "mapping",
            ConfigValue::Null => "null",
            ConfigValue::Unsupported(_) => "unsupported number",
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigValue::Mapping(_))
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Scalar(s) => write!(f, "{}", s),
            ConfigValue::Sequence(items) => write!(f, "[{} items]", items.len()),
            ConfigValue::Mapping(entries) => write!(f, "{{{} entries}}", entries.len()),
            ConfigValue::Null => f.write_str("null"),
            ConfigValue::Unsupported(n) => write!(f, "{}", n),
        }
    }
}

impl From<Scalar> for ConfigValue {
    fn from(value: Scalar) -> Self {
        ConfigValue::Scalar(value)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Scalar(Scalar::Boolean(b)),
            Value::String(s) => ConfigValue::Scalar(Scalar::String(s)),
            Value::Number(n) => decode_number(n),
            Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(map) => ConfigValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Integers narrow to the smallest of `Integer`/`Long` that holds them;
/// anything fractional is a `Double`.
fn decode_number(n: serde_json::Number) -> ConfigValue {
    if let Some(i) = n.as_i64() {
        return match i32::try_from(i) {
            Ok(small) => ConfigValue::Scalar(Scalar::Integer(small)),
            Err(_) => ConfigValue::Scalar(Scalar::Long(i)),
        };
    }
    if n.is_u64() {
        return ConfigValue::Unsupported(n);
    }
    match n.as_f64() {
        Some(f) => ConfigValue::Scalar(Scalar::Double(f)),
        None => ConfigValue::Unsupported(n),
    }
}
