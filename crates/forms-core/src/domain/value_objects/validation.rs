//! Field validation constraints

use serde::{Deserialize, Serialize};

/// Optional bag of constraints attached to a field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Replaces every generated failure message for the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self { pattern: Some(pattern.into()), ..Default::default() }
    }

    pub fn bounds(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max, ..Default::default() }
    }

    pub fn length(min_length: Option<usize>, max_length: Option<usize>) -> Self {
        Self { min_length, max_length, ..Default::default() }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.custom_message = Some(message.into());
        self
    }

    /// Strip constraints that do not apply to numeric or text answers
    pub(crate) fn retain_for(&mut self, numeric: bool, text_like: bool) {
        if !numeric {
            self.min = None;
            self.max = None;
            self.step = None;
        }
        if !text_like {
            self.min_length = None;
            self.max_length = None;
            self.pattern = None;
        }
    }
}
