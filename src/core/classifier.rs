//! CR-002: Entry classification.
//!
//! Turns a raw recipe value into an [`ExecutableEntry`] tree. The accepted
//! shapes, checked in this order:
//! - `!script` tagged string → [`ExecutableEntry::Script`]
//! - string → [`ExecutableEntry::Command`]
//! - sequence of strings → [`ExecutableEntry::Commands`]
//! - mapping with string keys → [`ExecutableEntry::Map`], values classified
//!   recursively under their own key as the entry name
//!
//! Classification stops at the first malformed value. Errors from nested
//! values are returned as-is, so they always name the innermost key.

use super::types::{EntriesMap, ExecutableEntry, ScriptBlock};
use serde_yaml_ng::{Mapping, Value};
use std::fmt;
use thiserror::Error;

/// YAML tag marking an inline script block (`!script`).
pub const SCRIPT_TAG: &str = "script";

/// Classification failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("entry '{name}' has a sub-entry key which is not a string: {}", render_value(.key))]
    InvalidKey { name: String, key: Value },

    #[error(
        "entry '{name}' is not a valid executable entry: the value {} is of type {kind}, \
         which is not a valid type for an executable entry",
        render_value(.value)
    )]
    UnsupportedShape {
        name: String,
        value: Value,
        kind: ValueKind,
    },

    #[error("entry '{name}' must be a mapping of sub-entries, got {kind}")]
    ExpectedMapping { name: String, kind: ValueKind },
}

impl EntryError {
    /// Name of the entry the error was raised for.
    pub fn entry_name(&self) -> &str {
        match self {
            Self::InvalidKey { name, .. }
            | Self::UnsupportedShape { name, .. }
            | Self::ExpectedMapping { name, .. } => name,
        }
    }
}

/// Observed type of a raw value, for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Sequence,
    Mapping,
    Tagged(String),
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Sequence(_) => Self::Sequence,
            Value::Mapping(_) => Self::Mapping,
            Value::Tagged(tagged) => Self::Tagged(tagged.tag.to_string()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Sequence => write!(f, "sequence"),
            Self::Mapping => write!(f, "mapping"),
            Self::Tagged(tag) => write!(f, "tagged value {}", tag),
        }
    }
}

/// Render a raw value on one line for error messages.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{:?}", s),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(mapping) => {
            let pairs: Vec<String> = mapping
                .iter()
                .map(|(k, v)| format!("{}: {}", render_value(k), render_value(v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, render_value(&tagged.value)),
    }
}

/// Classify a raw value into an executable entry.
///
/// `name` only labels error messages. No depth limit is applied here:
/// recursion follows the nesting of `value`. Values parsed by serde_yaml_ng
/// are already capped by its parser recursion limit; hand-built values are
/// bounded only by the thread stack.
pub fn classify(value: &Value, name: &str) -> Result<ExecutableEntry, EntryError> {
    match value {
        Value::Tagged(tagged) if tagged.tag == SCRIPT_TAG => match &tagged.value {
            Value::String(source) => Ok(ExecutableEntry::Script(ScriptBlock::new(source.as_str()))),
            _ => Err(unsupported(name, value)),
        },
        Value::String(command) => Ok(ExecutableEntry::Command(command.clone())),
        Value::Sequence(items) => classify_commands(items, name).map(ExecutableEntry::Commands),
        Value::Mapping(mapping) => collect_entries(mapping, name).map(ExecutableEntry::Map),
        other => Err(unsupported(name, other)),
    }
}

/// Classify a raw value that must be a mapping of named sub-entries.
pub fn classify_map(value: &Value, name: &str) -> Result<EntriesMap, EntryError> {
    match value {
        Value::Mapping(mapping) => collect_entries(mapping, name),
        other => Err(EntryError::ExpectedMapping {
            name: name.to_string(),
            kind: ValueKind::of(other),
        }),
    }
}

fn collect_entries(mapping: &Mapping, name: &str) -> Result<EntriesMap, EntryError> {
    let mut entries = EntriesMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Value::String(key) = key else {
            return Err(EntryError::InvalidKey {
                name: name.to_string(),
                key: key.clone(),
            });
        };
        let entry = classify(value, key)?;
        entries.insert(key.clone(), entry);
    }
    Ok(entries)
}

fn classify_commands(items: &[Value], name: &str) -> Result<Vec<String>, EntryError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(command) => Ok(command.clone()),
            other => Err(unsupported(&format!("{}[{}]", name, i), other)),
        })
        .collect()
}

fn unsupported(name: &str, value: &Value) -> EntryError {
    EntryError::UnsupportedShape {
        name: name.to_string(),
        value: value.clone(),
        kind: ValueKind::of(value),
    }
}
