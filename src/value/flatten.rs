//! Flattening of a value tree into dotted-path properties.
//!
//! # Rules
//! - Scalar at path `p` → `p = value`
//! - Sequence at `p` → element `i` recurses at `p.i` (zero-based, no padding)
//! - Mapping at `p` → entry `k` recurses at `p.k` (just `k` at the root)
//! - Empty sequences and mappings emit nothing
//! - Null or unsupported numbers fail with [`InvalidValue`]
//! - Two leaves reaching the same dotted path fail with [`InvalidValue`]

use thiserror::Error;

use crate::value::types::{ConfigValue, FlatDict};

/// A leaf that cannot be stored as a property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value at key `{key}`: {value}")]
pub struct InvalidValue {
    /// Dotted path of the offending leaf.
    pub key: String,
    /// Rendered offending value.
    pub value: String,
}

/// Flatten a value tree into a sorted property set.
pub fn flatten(value: &ConfigValue) -> Result<FlatDict, InvalidValue> {
    let mut dict = FlatDict::new();
    flatten_into(&mut dict, "", value)?;
    Ok(dict)
}

/// Parse JSON text and flatten it.
pub fn flatten_json(text: &str) -> Result<FlatDict, FlattenJsonError> {
    let parsed: serde_json::Value = serde_json::from_str(text)?;
    Ok(flatten(&ConfigValue::from(parsed))?)
}

/// Failure of [`flatten_json`].
#[derive(Debug, Error)]
pub enum FlattenJsonError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] InvalidValue),
}

fn flatten_into(dict: &mut FlatDict, path: &str, value: &ConfigValue) -> Result<(), InvalidValue> {
    match value {
        ConfigValue::Scalar(scalar) => {
            // `{"a.b": 1}` and `{"a": {"b": 2}}` both land on `a.b`.
            if dict.insert(path.to_string(), scalar.clone()).is_some() {
                return Err(InvalidValue {
                    key: path.to_string(),
                    value: format!("{} (path already produced by another key)", scalar),
                });
            }
        }
        ConfigValue::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(dict, &child_path(path, &index.to_string()), item)?;
            }
        }
        ConfigValue::Mapping(entries) => {
            for (key, item) in entries {
                flatten_into(dict, &child_path(path, key), item)?;
            }
        }
        ConfigValue::Null | ConfigValue::Unsupported(_) => {
            return Err(InvalidValue {
                key: path.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn child_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Recover the elements of a flattened sequence stored under `prefix`.
///
/// Indices are read as the dense range `0..n`; the first missing index ends
/// the sequence. Each element comes back as its own property set with keys
/// relative to the element, so a scalar element is keyed by `""`.
pub fn unflatten_sequence(dict: &FlatDict, prefix: &str) -> Vec<FlatDict> {
    let mut elements = Vec::new();
    loop {
        let element_path = child_path(prefix, &elements.len().to_string());
        let nested = format!("{}.", element_path);

        let element: FlatDict = dict
            .range(element_path.clone()..)
            .take_while(|(key, _)| key.starts_with(&element_path))
            .filter_map(|(key, value)| {
                if *key == element_path {
                    Some((String::new(), value.clone()))
                } else {
                    key.strip_prefix(&nested)
                        .map(|rest| (rest.to_string(), value.clone()))
                }
            })
            .collect();

        if element.is_empty() {
            return elements;
        }
        elements.push(element);
    }
}
