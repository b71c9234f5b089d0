//! Data Transfer Objects (DTOs)
//!
//! Commands and views crossing the application boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::aggregates::{Form, FormSchema};
use crate::domain::services::ValidationReport;
use crate::domain::value_objects::{AnswerMap, FormId, OwnerId};

// =============================================================================
// Form Commands
// =============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateFormCommand {
    pub schema: FormSchema,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateFormCommand {
    pub form_id: FormId,
    pub schema: FormSchema,
}

// =============================================================================
// Submission Commands
// =============================================================================

/// Identity supplied by the page embedding a public form
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_company: Option<String>,
    /// Any other key/value pairs, passed through verbatim
    #[serde(flatten)]
    pub extras: BTreeMap<String, String>,
}

impl EmbedContext {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Copy every identity entry into `metadata`, overwriting same-named keys
    pub fn merge_into(&self, metadata: &mut Map<String, Value>) {
        let known = [
            ("userId", &self.user_id),
            ("userName", &self.user_name),
            ("userEmail", &self.user_email),
            ("userCompany", &self.user_company),
        ];
        for (key, value) in known {
            if let Some(value) = value {
                metadata.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        for (key, value) in &self.extras {
            metadata.insert(key.clone(), Value::String(value.clone()));
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitResponseCommand {
    pub form_id: FormId,
    pub answers: AnswerMap,
    #[serde(default)]
    pub embed: EmbedContext,
    /// Client metadata (user agent, referrer...), passed through untouched
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SubmitResponseCommand {
    pub fn new(form_id: FormId, answers: AnswerMap) -> Self {
        Self { form_id, answers, embed: EmbedContext::default(), metadata: Map::new() }
    }

    pub fn with_embed(mut self, embed: EmbedContext) -> Self {
        self.embed = embed;
        self
    }

    /// Metadata handed to the submission collaborator
    pub fn submission_metadata(&self, submitted_at: DateTime<Utc>) -> Map<String, Value> {
        let mut metadata = self.metadata.clone();
        self.embed.merge_into(&mut metadata);
        metadata.insert("submittedAt".into(), Value::String(submitted_at.to_rfc3339()));
        metadata
    }
}

// =============================================================================
// Views (Read Models)
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: FormId,
    pub title: String,
    pub owner_id: OwnerId,
    pub field_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Form> for FormSummary {
    fn from(form: &Form) -> Self {
        Self {
            id: form.id.clone(),
            title: form.schema.title.clone(),
            owner_id: form.owner_id.clone(),
            field_count: form.schema.fields.len(),
            updated_at: form.updated_at,
        }
    }
}

/// Result of a submission attempt that reached the service
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Accepted { submission_id: String },
    Rejected { report: ValidationReport },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}
