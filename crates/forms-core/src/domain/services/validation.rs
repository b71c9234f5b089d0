//! Validation engine
//!
//! Checks an answer map against a form schema. Failures are returned as a
//! report, never as an error.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::ValidationOptions;
use crate::domain::aggregates::{FieldSchema, FormSchema};
use crate::domain::value_objects::{AnswerMap, AnswerValue, FieldId, FieldKind};

/// Outcome of validating one answer map
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: BTreeMap<FieldId, String>,
}

impl ValidationReport {
    fn from_errors(errors: BTreeMap<FieldId, String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn error_for(&self, id: &FieldId) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ValidationEngine {
    options: ValidationOptions,
}

impl ValidationEngine {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Validate every answer-collecting field of `schema`
    pub fn validate(&self, schema: &FormSchema, answers: &AnswerMap) -> ValidationReport {
        let errors = schema
            .input_fields()
            .filter_map(|field| {
                self.check_field(field, answers.get(&field.id))
                    .map(|message| (field.id.clone(), message))
            })
            .collect::<BTreeMap<_, _>>();

        let report = ValidationReport::from_errors(errors);
        tracing::debug!(valid = report.valid, errors = report.error_count(), "validated answers");
        report
    }

    /// First failing rule for one field, if any
    pub fn check_field(&self, field: &FieldSchema, value: Option<&AnswerValue>) -> Option<String> {
        if !field.accepts_input() {
            return None;
        }

        let value = match value.filter(|v| !v.is_empty()) {
            Some(value) => value,
            None if field.is_required() => {
                return Some(self.message(field, || {
                    format!("{} {}", field.label, self.options.required_suffix)
                }));
            }
            None => return None,
        };

        let rules = field.validation();
        match field.kind {
            FieldKind::Number | FieldKind::Range => {
                // Answers that do not coerce to a number violate no bound
                let number = value.as_number()?;
                if let Some(min) = rules.and_then(|r| r.min) {
                    if number < min {
                        return Some(self.message(field, || format!("Value must be at least {}", min)));
                    }
                }
                if let Some(max) = rules.and_then(|r| r.max) {
                    if number > max {
                        return Some(self.message(field, || format!("Value must be at most {}", max)));
                    }
                }
                None
            }
            FieldKind::Text | FieldKind::Textarea => {
                let text = value.as_text()?;
                let length = text.chars().count();
                if let Some(min) = rules.and_then(|r| r.min_length) {
                    if length < min {
                        return Some(self.message(field, || format!("Must be at least {} characters", min)));
                    }
                }
                if let Some(max) = rules.and_then(|r| r.max_length) {
                    if length > max {
                        return Some(self.message(field, || format!("Must be at most {} characters", max)));
                    }
                }
                if field.kind == FieldKind::Text {
                    if let Some(pattern) = rules.and_then(|r| r.pattern.as_deref()) {
                        return self.check_pattern(field, pattern, &text);
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn check_pattern(&self, field: &FieldSchema, pattern: &str, text: &str) -> Option<String> {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(text) => None,
            Ok(_) => Some(self.message(field, || self.options.pattern_message.clone())),
            Err(e) => {
                tracing::warn!(field_id = %field.id, pattern, error = %e, "skipping invalid pattern");
                None
            }
        }
    }

    fn message(&self, field: &FieldSchema, generated: impl FnOnce() -> String) -> String {
        field.custom_message().map(str::to_string).unwrap_or_else(generated)
    }
}
