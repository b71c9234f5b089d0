//! Fill session
//!
//! One respondent filling one form. The session owns a private copy of the
//! schema and its answer map; the submission guard is a state machine
//! `Idle -> Submitting -> {Succeeded, Failed}`.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::application::dto::{EmbedContext, SubmissionOutcome, SubmitResponseCommand};
use crate::config::FormsConfig;
use crate::domain::aggregates::{Form, FormSchema};
use crate::domain::services::{
    missing_required, FillState, RenderMode, RenderedForm, Renderer, ValidationEngine, ValidationReport,
};
use crate::domain::value_objects::{AnswerMap, AnswerValue, FieldId, FormId};
use crate::error::{FormsError, Result};
use crate::ports::inbound::FormUseCases;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded { submission_id: String },
    Failed { reason: String },
}

pub struct FillSession {
    form_id: FormId,
    schema: FormSchema,
    answers: AnswerMap,
    errors: BTreeMap<FieldId, String>,
    state: SubmissionState,
    renderer: Renderer,
    validator: ValidationEngine,
}

impl FillSession {
    /// Start a session on a private copy of `form`'s schema
    pub fn new(form: &Form, config: &FormsConfig) -> Self {
        let schema = form.schema.clone();
        let answers = schema.initial_answers();
        Self {
            form_id: form.id.clone(),
            schema,
            answers,
            errors: BTreeMap::new(),
            state: SubmissionState::Idle,
            renderer: Renderer::new(config.builder.clone()),
            validator: ValidationEngine::new(config.validation.clone()),
        }
    }

    pub fn form_id(&self) -> &FormId {
        &self.form_id
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn errors(&self) -> &BTreeMap<FieldId, String> {
        &self.errors
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Record a value and clear any error shown for that field
    pub fn set_answer(&mut self, id: &FieldId, value: impl Into<AnswerValue>) -> Result<()> {
        match self.schema.field(id) {
            Some(field) if field.accepts_input() => {}
            Some(_) => {
                return Err(FormsError::InvalidSchema(format!("field {} does not accept answers", id)));
            }
            None => return Err(FormsError::FieldNotFound(id.clone())),
        }
        self.answers.set(id.clone(), value);
        self.errors.remove(id);
        Ok(())
    }

    pub fn clear_answer(&mut self, id: &FieldId) {
        self.answers.remove(id);
        self.errors.remove(id);
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        matches!(self.state, SubmissionState::Idle | SubmissionState::Failed { .. })
            && missing_required(&self.schema, &self.answers).is_empty()
    }

    pub fn render(&self) -> RenderedForm {
        let state = FillState {
            answers: &self.answers,
            errors: &self.errors,
            submitting: self.state == SubmissionState::Submitting,
        };
        self.renderer.render(&self.schema, RenderMode::Fill, Some(state))
    }

    /// Validate the current answers and show the resulting errors
    pub fn validate(&mut self) -> ValidationReport {
        let report = self.validator.validate(&self.schema, &self.answers);
        self.errors = report.errors.clone();
        report
    }

    /// Enter `Submitting`. Returns `None` when local validation fails; the
    /// errors are recorded and the session stays idle.
    pub fn begin_submit(&mut self) -> Result<Option<AnswerMap>> {
        match self.state {
            SubmissionState::Submitting => return Err(FormsError::SubmissionInProgress),
            SubmissionState::Succeeded { .. } => return Err(FormsError::AlreadySubmitted),
            SubmissionState::Idle | SubmissionState::Failed { .. } => {}
        }

        if !self.validate().is_valid() {
            tracing::debug!(form_id = %self.form_id, errors = self.errors.len(), "submit blocked by validation");
            return Ok(None);
        }
        self.state = SubmissionState::Submitting;
        Ok(Some(self.answers.clone()))
    }

    /// Leave `Submitting` with the collaborator's result. Answers are kept
    /// on failure so the respondent can retry.
    pub fn complete_submit(&mut self, result: Result<SubmissionOutcome>) -> Result<SubmissionOutcome> {
        if self.state != SubmissionState::Submitting {
            tracing::warn!(form_id = %self.form_id, state = ?self.state, "no submission in progress");
            return result;
        }
        match result {
            Ok(SubmissionOutcome::Accepted { submission_id }) => {
                self.state = SubmissionState::Succeeded { submission_id: submission_id.clone() };
                Ok(SubmissionOutcome::Accepted { submission_id })
            }
            Ok(SubmissionOutcome::Rejected { report }) => {
                self.errors = report.errors.clone();
                self.state = SubmissionState::Idle;
                Ok(SubmissionOutcome::Rejected { report })
            }
            Err(e) => {
                tracing::warn!(form_id = %self.form_id, error = %e, "submission failed, answers kept");
                self.state = SubmissionState::Failed { reason: e.to_string() };
                Err(e)
            }
        }
    }

    /// Validate, submit through `service` and settle the state
    pub async fn submit<U>(&mut self, service: &U, embed: EmbedContext) -> Result<SubmissionOutcome>
    where
        U: FormUseCases + ?Sized,
    {
        let Some(answers) = self.begin_submit()? else {
            return Ok(SubmissionOutcome::Rejected {
                report: ValidationReport { valid: false, errors: self.errors.clone() },
            });
        };
        let command = SubmitResponseCommand::new(self.form_id.clone(), answers).with_embed(embed);
        let result = service.submit_response(command).await;
        self.complete_submit(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::FormService;
    use crate::application::dto::CreateFormCommand;
    use crate::domain::aggregates::FieldSchema;
    use crate::domain::value_objects::{Actor, FieldKind};
    use crate::infrastructure::{InMemoryFormRepository, InMemorySubmissionStore, NoOpAnalytics};
    use std::sync::Arc;

    fn schema() -> FormSchema {
        let mut schema = FormSchema::new("Survey");
        schema.fields = vec![
            FieldSchema::labeled(FieldKind::Text, "Name").with_id("name").required(),
            FieldSchema::labeled(FieldKind::Text, "City").with_id("city").with_default("Berlin"),
            FieldSchema::labeled(FieldKind::Divider, "").with_id("rule"),
        ];
        schema
    }

    async fn setup() -> (FormService, Arc<InMemorySubmissionStore>, Form) {
        let store = Arc::new(InMemorySubmissionStore::new());
        let service = FormService::new(
            Arc::new(InMemoryFormRepository::new()),
            store.clone(),
            Arc::new(NoOpAnalytics),
            &FormsConfig::default(),
        );
        let form = service
            .create_form(&Actor::user("ann"), CreateFormCommand { schema: schema() })
            .await
            .unwrap();
        (service, store, form)
    }

    fn session() -> FillSession {
        let form = Form::create(Actor::user("ann").id, schema());
        FillSession::new(&form, &FormsConfig::default())
    }

    #[test]
    fn test_defaults_seed_answers() {
        let session = session();
        assert_eq!(session.answers().get(&"city".into()), Some(&AnswerValue::from("Berlin")));
        assert!(!session.can_submit());
    }

    #[test]
    fn test_set_answer_clears_error() {
        let mut s = session();
        assert!(!s.validate().is_valid());
        assert!(s.errors().contains_key(&FieldId::from("name")));

        s.set_answer(&"name".into(), "Ann").unwrap();
        assert!(s.errors().is_empty());
        assert!(s.can_submit());

        assert!(matches!(s.set_answer(&"rule".into(), "x"), Err(FormsError::InvalidSchema(_))));
        assert!(matches!(s.set_answer(&"ghost".into(), "x"), Err(FormsError::FieldNotFound(_))));
    }

    #[test]
    fn test_guard_rejects_reentry() {
        let mut s = session();
        s.set_answer(&"name".into(), "Ann").unwrap();

        assert!(s.begin_submit().unwrap().is_some());
        assert_eq!(s.begin_submit(), Err(FormsError::SubmissionInProgress));
        assert!(!s.can_submit());
        assert!(s.render().submit.disabled);
    }

    #[test]
    fn test_failure_keeps_answers_and_allows_retry() {
        let mut s = session();
        s.set_answer(&"name".into(), "Ann").unwrap();
        s.begin_submit().unwrap();

        let err = s.complete_submit(Err(FormsError::SubmissionFailed("offline".into()))).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(s.state(), SubmissionState::Failed { .. }));
        assert!(!s.answers().is_blank(&"name".into()));

        assert!(s.begin_submit().unwrap().is_some());
        let outcome = s
            .complete_submit(Ok(SubmissionOutcome::Accepted { submission_id: "s1".into() }))
            .unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(s.begin_submit(), Err(FormsError::AlreadySubmitted));
    }

    #[test]
    fn test_invalid_answers_stay_idle() {
        let mut s = session();
        assert_eq!(s.begin_submit(), Ok(None));
        assert_eq!(s.state(), &SubmissionState::Idle);
        assert_eq!(s.render().fields()[0].error.as_deref(), Some("Name is required"));
    }

    #[tokio::test]
    async fn test_submit_through_service() {
        let (service, store, form) = setup().await;
        let mut s = FillSession::new(&form, &FormsConfig::default());
        s.set_answer(&"name".into(), "Ann").unwrap();

        let outcome = s
            .submit(&service, EmbedContext { user_id: Some("u-7".into()), ..Default::default() })
            .await
            .unwrap();
        assert!(outcome.is_accepted());
        assert!(matches!(s.state(), SubmissionState::Succeeded { .. }));

        let stored = store.for_form(&form.id);
        assert_eq!(stored[0].metadata["userId"], "u-7");
        assert!(!stored[0].answers.contains(&"rule".into()));
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_answers() {
        let (_service, _store, form) = setup().await;
        let mut first = FillSession::new(&form, &FormsConfig::default());
        let second = FillSession::new(&form, &FormsConfig::default());

        first.set_answer(&"city".into(), "Paris").unwrap();
        assert_eq!(second.answers().get(&"city".into()), Some(&AnswerValue::from("Berlin")));
    }
}
