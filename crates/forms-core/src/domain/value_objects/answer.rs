//! Answer values entered while filling a form

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::FieldId;

/// Opaque handle to an uploaded file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// One user-entered value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    File(FileHandle),
}

impl AnswerValue {
    /// `""` and `[]` count as no answer
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Number(_) | Self::File(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Bool(b) => Some(Cow::Owned(b.to_string())),
            Self::File(file) => Some(Cow::Borrowed(&file.name)),
            Self::List(_) => None,
        }
    }

    /// Numeric coercion: numbers as-is, text parsed after trimming
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Text(s) if !s.is_empty() => vec![s.as_str()],
            _ => Vec::new(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Answers of one fill session keyed by field id
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<FieldId, AnswerValue>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &FieldId) -> Option<&AnswerValue> {
        self.0.get(id)
    }

    pub fn set(&mut self, id: FieldId, value: impl Into<AnswerValue>) {
        self.0.insert(id, value.into());
    }

    pub fn remove(&mut self, id: &FieldId) -> Option<AnswerValue> {
        self.0.remove(id)
    }

    /// Missing, `""` or `[]`
    pub fn is_blank(&self, id: &FieldId) -> bool {
        self.0.get(id).map(AnswerValue::is_empty).unwrap_or(true)
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &AnswerValue)> {
        self.0.iter()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&FieldId) -> bool) {
        self.0.retain(|id, _| keep(id));
    }
}

impl<'de> Deserialize<'de> for AnswerMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<FieldId, Option<AnswerValue>>::deserialize(deserializer)?;
        Ok(Self(raw.into_iter().filter_map(|(id, v)| v.map(|v| (id, v))).collect()))
    }
}

impl<K: Into<FieldId>, V: Into<AnswerValue>> FromIterator<(K, V)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_answers() {
        let mut answers = AnswerMap::new();
        let id = FieldId::from("name");
        assert!(answers.is_blank(&id));

        answers.set(id.clone(), "");
        assert!(answers.is_blank(&id));

        answers.set(id.clone(), Vec::<String>::new());
        assert!(answers.is_blank(&id));

        answers.set(id.clone(), false);
        assert!(!answers.is_blank(&id));
    }

    #[test]
    fn test_untagged_wire_format() {
        let answers: AnswerMap = serde_json::from_str(
            r#"{"a": "Ann", "b": 42, "c": ["x", "y"], "d": true, "e": null, "f": {"name": "cv.pdf", "size": 10}}"#,
        )
        .unwrap();
        assert_eq!(answers.len(), 5);
        assert_eq!(answers.get(&"b".into()), Some(&AnswerValue::Number(42.0)));
        assert_eq!(answers.get(&"c".into()).unwrap().as_list(), vec!["x", "y"]);
        assert!(matches!(answers.get(&"f".into()), Some(AnswerValue::File(_))));
        assert!(!answers.contains(&"e".into()));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(AnswerValue::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(AnswerValue::from("abc").as_number(), None);
        assert_eq!(AnswerValue::from(true).as_number(), None);
    }
}
