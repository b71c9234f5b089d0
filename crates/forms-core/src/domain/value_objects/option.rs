//! Choice option value object
//!
//! Options are stored as `{label, value}` records. Schemas written by the
//! simplified block model carry bare strings instead; those are accepted on
//! read and normalized to `label == value`.

use serde::{Deserialize, Deserializer, Serialize};

/// One entry of a choice field's option list
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }

    /// Option whose value mirrors its label
    pub fn labeled(label: impl Into<String>) -> Self {
        let label = label.into();
        Self { value: label.clone(), label }
    }

    /// Placeholder option `"<prefix> <n>"` with a slug value
    pub fn placeholder(prefix: &str, n: usize) -> Self {
        Self {
            label: format!("{} {}", prefix, n),
            value: format!("{}_{}", prefix.to_lowercase().replace(' ', "_"), n),
        }
    }

    /// Seed list used for a freshly created choice field
    pub fn seed(prefix: &str, count: usize) -> Vec<Self> {
        (1..=count.max(1)).map(|n| Self::placeholder(prefix, n)).collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionRepr {
    Record { label: String, value: Option<String> },
    Bare(String),
}

impl<'de> Deserialize<'de> for FieldOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match OptionRepr::deserialize(deserializer)? {
            OptionRepr::Record { label, value: Some(value) } => Self { label, value },
            OptionRepr::Record { label, value: None } => Self::labeled(label),
            OptionRepr::Bare(label) => Self::labeled(label),
        })
    }
}

impl From<&str> for FieldOption {
    fn from(label: &str) -> Self {
        Self::labeled(label)
    }
}
