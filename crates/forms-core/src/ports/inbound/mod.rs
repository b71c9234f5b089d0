//! Inbound ports (Use case traits)

use async_trait::async_trait;

use crate::application::dto::*;
use crate::domain::aggregates::Form;
use crate::domain::services::{RenderMode, RenderedForm, ValidationReport};
use crate::domain::value_objects::{Actor, AnswerMap, FormId, OwnerId};
use crate::error::Result;

/// Form management and submission use cases
#[async_trait]
pub trait FormUseCases: Send + Sync {
    /// Persist a new form owned by `actor`
    async fn create_form(&self, actor: &Actor, command: CreateFormCommand) -> Result<Form>;

    /// Load a form, normalising its schema
    async fn get_form(&self, id: &FormId) -> Result<Form>;

    /// Replace a form's schema; non-admins may only touch their own forms
    async fn update_form(&self, actor: &Actor, command: UpdateFormCommand) -> Result<Form>;

    async fn delete_form(&self, actor: &Actor, id: &FormId) -> Result<()>;

    async fn list_forms(&self, owner: &OwnerId) -> Result<Vec<FormSummary>>;

    /// Render a stored form in edit or (empty) fill mode
    async fn render_form(&self, id: &FormId, mode: RenderMode) -> Result<RenderedForm>;

    /// Validate answers without submitting them
    async fn validate_answers(&self, id: &FormId, answers: &AnswerMap) -> Result<ValidationReport>;

    /// Validate, then hand the answers to the submission collaborator
    async fn submit_response(&self, command: SubmitResponseCommand) -> Result<SubmissionOutcome>;
}
