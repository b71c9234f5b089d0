//! Domain Events
//!
//! Raised by the application layer and handed to the analytics sink.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::{FormId, OwnerId};

/// All domain events of the forms bounded context
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    Form(FormEvent),
    Submission(SubmissionEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    Created {
        form_id: FormId,
        owner_id: OwnerId,
        field_count: usize,
        created_at: DateTime<Utc>,
    },
    Updated {
        form_id: FormId,
        field_count: usize,
        updated_at: DateTime<Utc>,
    },
    Deleted {
        form_id: FormId,
        deleted_at: DateTime<Utc>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SubmissionEvent {
    Accepted {
        form_id: FormId,
        submission_id: String,
        submitted_at: DateTime<Utc>,
    },
    Rejected {
        form_id: FormId,
        error_count: usize,
    },
    Failed {
        form_id: FormId,
        reason: String,
    },
}

impl DomainEvent {
    /// Form this event belongs to
    pub fn form_id(&self) -> &FormId {
        match self {
            DomainEvent::Form(e) => match e {
                FormEvent::Created { form_id, .. } => form_id,
                FormEvent::Updated { form_id, .. } => form_id,
                FormEvent::Deleted { form_id, .. } => form_id,
            },
            DomainEvent::Submission(e) => match e {
                SubmissionEvent::Accepted { form_id, .. } => form_id,
                SubmissionEvent::Rejected { form_id, .. } => form_id,
                SubmissionEvent::Failed { form_id, .. } => form_id,
            },
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::Form(e) => match e {
                FormEvent::Created { .. } => "form.created",
                FormEvent::Updated { .. } => "form.updated",
                FormEvent::Deleted { .. } => "form.deleted",
            },
            DomainEvent::Submission(e) => match e {
                SubmissionEvent::Accepted { .. } => "submission.accepted",
                SubmissionEvent::Rejected { .. } => "submission.rejected",
                SubmissionEvent::Failed { .. } => "submission.failed",
            },
        }
    }
}
