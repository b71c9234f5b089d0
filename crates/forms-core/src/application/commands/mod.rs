//! Command handlers
//!
//! `FormService` wraps the persistence and submission collaborators around
//! the pure domain services.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::application::dto::*;
use crate::config::FormsConfig;
use crate::domain::aggregates::{Form, FormSchema};
use crate::domain::events::{DomainEvent, FormEvent, SubmissionEvent};
use crate::domain::services::{
    RenderMode, RenderedForm, Renderer, SchemaBuilder, ValidationEngine, ValidationReport,
};
use crate::domain::value_objects::{Actor, AnswerMap, FormId, OwnerId};
use crate::error::{FormsError, Result};
use crate::ports::inbound::FormUseCases;
use crate::ports::outbound::{AnalyticsSink, FormRepository, SubmissionGateway};

/// Form application service
pub struct FormService {
    repository: Arc<dyn FormRepository>,
    submissions: Arc<dyn SubmissionGateway>,
    analytics: Arc<dyn AnalyticsSink>,
    builder: SchemaBuilder,
    renderer: Renderer,
    validator: ValidationEngine,
}

impl FormService {
    pub fn new(
        repository: Arc<dyn FormRepository>,
        submissions: Arc<dyn SubmissionGateway>,
        analytics: Arc<dyn AnalyticsSink>,
        config: &FormsConfig,
    ) -> Self {
        Self {
            repository,
            submissions,
            analytics,
            builder: SchemaBuilder::new(config.builder.clone()),
            renderer: Renderer::new(config.builder.clone()),
            validator: ValidationEngine::new(config.validation.clone()),
        }
    }

    pub fn builder(&self) -> &SchemaBuilder {
        &self.builder
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn validator(&self) -> &ValidationEngine {
        &self.validator
    }

    fn prepare(&self, schema: FormSchema) -> Result<FormSchema> {
        let schema = self.builder.hydrate(schema);
        schema.check_persistable()?;
        Ok(schema)
    }

    /// Load a form the actor may modify
    async fn load_writable(&self, actor: &Actor, id: &FormId) -> Result<Form> {
        let form = self.get_form(id).await?;
        if let Some(owner) = actor.write_scope() {
            if !form.is_owned_by(owner) {
                tracing::warn!(form_id = %id, actor = %actor.id, "rejecting write to foreign form");
                return Err(FormsError::Unauthorized);
            }
        }
        Ok(form)
    }
}

#[async_trait]
impl FormUseCases for FormService {
    async fn create_form(&self, actor: &Actor, command: CreateFormCommand) -> Result<Form> {
        let schema = self.prepare(command.schema)?;
        let form = Form::create(actor.id.clone(), schema);

        self.repository.create(&form).await?;
        tracing::info!(form_id = %form.id, owner = %form.owner_id, title = %form.title(), "form created");

        self.analytics
            .capture(&DomainEvent::Form(FormEvent::Created {
                form_id: form.id.clone(),
                owner_id: form.owner_id.clone(),
                field_count: form.schema.fields.len(),
                created_at: form.created_at,
            }))
            .await;
        Ok(form)
    }

    async fn get_form(&self, id: &FormId) -> Result<Form> {
        let mut form = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| FormsError::FormNotFound(id.clone()))?;
        form.schema = self.builder.hydrate(form.schema);
        Ok(form)
    }

    async fn update_form(&self, actor: &Actor, command: UpdateFormCommand) -> Result<Form> {
        let mut form = self.load_writable(actor, &command.form_id).await?;
        form.replace_schema(self.prepare(command.schema)?);

        self.repository.update(&form, actor.write_scope()).await?;
        tracing::info!(form_id = %form.id, fields = form.schema.fields.len(), "form updated");

        self.analytics
            .capture(&DomainEvent::Form(FormEvent::Updated {
                form_id: form.id.clone(),
                field_count: form.schema.fields.len(),
                updated_at: form.updated_at,
            }))
            .await;
        Ok(form)
    }

    async fn delete_form(&self, actor: &Actor, id: &FormId) -> Result<()> {
        self.load_writable(actor, id).await?;
        self.repository.delete(id, actor.write_scope()).await?;
        tracing::info!(form_id = %id, actor = %actor.id, "form deleted");

        self.analytics
            .capture(&DomainEvent::Form(FormEvent::Deleted { form_id: id.clone(), deleted_at: Utc::now() }))
            .await;
        Ok(())
    }

    async fn list_forms(&self, owner: &OwnerId) -> Result<Vec<FormSummary>> {
        let forms = self.repository.list_by_owner(owner).await?;
        Ok(forms.iter().map(FormSummary::from).collect())
    }

    async fn render_form(&self, id: &FormId, mode: RenderMode) -> Result<RenderedForm> {
        let form = self.get_form(id).await?;
        Ok(self.renderer.render(&form.schema, mode, None))
    }

    async fn validate_answers(&self, id: &FormId, answers: &AnswerMap) -> Result<ValidationReport> {
        let form = self.get_form(id).await?;
        Ok(self.validator.validate(&form.schema, answers))
    }

    async fn submit_response(&self, command: SubmitResponseCommand) -> Result<SubmissionOutcome> {
        let form = self.get_form(&command.form_id).await?;

        let report = self.validator.validate(&form.schema, &command.answers);
        if !report.is_valid() {
            tracing::info!(form_id = %form.id, errors = report.error_count(), "submission rejected");
            self.analytics
                .capture(&DomainEvent::Submission(SubmissionEvent::Rejected {
                    form_id: form.id.clone(),
                    error_count: report.error_count(),
                }))
                .await;
            return Ok(SubmissionOutcome::Rejected { report });
        }

        // Answers for static or image-only fields are never forwarded
        let mut answers = command.answers.clone();
        answers.retain(|id| form.schema.field(id).map(|f| f.accepts_input()).unwrap_or(false));

        let submitted_at = Utc::now();
        let metadata = command.submission_metadata(submitted_at);

        match self.submissions.submit(&form.id, &answers, &metadata).await {
            Ok(submission_id) => {
                tracing::info!(form_id = %form.id, submission_id = %submission_id, "submission accepted");
                self.analytics
                    .capture(&DomainEvent::Submission(SubmissionEvent::Accepted {
                        form_id: form.id.clone(),
                        submission_id: submission_id.clone(),
                        submitted_at,
                    }))
                    .await;
                Ok(SubmissionOutcome::Accepted { submission_id })
            }
            Err(e) => {
                tracing::error!(form_id = %form.id, error = %e, "submission failed");
                self.analytics
                    .capture(&DomainEvent::Submission(SubmissionEvent::Failed {
                        form_id: form.id.clone(),
                        reason: e.to_string(),
                    }))
                    .await;
                Err(FormsError::SubmissionFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::FieldSchema;
    use crate::domain::value_objects::{FieldKind, FieldId};
    use crate::infrastructure::{InMemoryFormRepository, InMemorySubmissionStore, RecordingAnalytics};

    struct Harness {
        service: FormService,
        submissions: Arc<InMemorySubmissionStore>,
        analytics: Arc<RecordingAnalytics>,
    }

    fn harness() -> Harness {
        let submissions = Arc::new(InMemorySubmissionStore::new());
        let analytics = Arc::new(RecordingAnalytics::new());
        let service = FormService::new(
            Arc::new(InMemoryFormRepository::new()),
            submissions.clone(),
            analytics.clone(),
            &FormsConfig::default(),
        );
        Harness { service, submissions, analytics }
    }

    fn contact_schema() -> FormSchema {
        let mut schema = FormSchema::new("Contact");
        schema.fields = vec![
            FieldSchema::labeled(FieldKind::Text, "Name").with_id("name").required(),
            FieldSchema::labeled(FieldKind::Email, "Email").with_id("email").required(),
            FieldSchema::labeled(FieldKind::Select, "Topic").with_id("topic").with_options(["Sales", "Support"]),
            FieldSchema::labeled(FieldKind::Heading, "Thanks").with_id("outro"),
        ];
        schema
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let h = harness();
        let owner = Actor::user("ann");
        let form = h.service.create_form(&owner, CreateFormCommand { schema: contact_schema() }).await.unwrap();

        let loaded = h.service.get_form(&form.id).await.unwrap();
        assert_eq!(loaded.schema, form.schema);
        assert_eq!(h.analytics.event_types(), vec!["form.created"]);

        let listed = h.service.list_forms(&owner.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].field_count, 4);
    }

    #[tokio::test]
    async fn test_duplicate_title_conflict() {
        let h = harness();
        let owner = Actor::user("ann");
        h.service.create_form(&owner, CreateFormCommand { schema: contact_schema() }).await.unwrap();

        let err = h.service.create_form(&owner, CreateFormCommand { schema: contact_schema() }).await.unwrap_err();
        assert!(matches!(err, FormsError::PersistenceConflict(_)));
        assert_eq!(err.to_string(), "a form with this title already exists");
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let h = harness();
        let err = h
            .service
            .create_form(&Actor::user("ann"), CreateFormCommand { schema: FormSchema::new("") })
            .await
            .unwrap_err();
        assert!(matches!(err, FormsError::InvalidSchema(_)));
    }

    #[tokio::test]
    async fn test_owner_scoped_updates() {
        let h = harness();
        let ann = Actor::user("ann");
        let form = h.service.create_form(&ann, CreateFormCommand { schema: contact_schema() }).await.unwrap();

        let mut schema = form.schema.clone();
        schema.title = "Contact us".into();
        let command = UpdateFormCommand { form_id: form.id.clone(), schema };

        let err = h.service.update_form(&Actor::user("bob"), command.clone()).await.unwrap_err();
        assert_eq!(err, FormsError::Unauthorized);

        let updated = h.service.update_form(&Actor::admin("root"), command).await.unwrap();
        assert_eq!(updated.title(), "Contact us");
        assert_eq!(updated.owner_id, ann.id);

        assert_eq!(h.service.delete_form(&Actor::user("bob"), &form.id).await, Err(FormsError::Unauthorized));
        h.service.delete_form(&ann, &form.id).await.unwrap();
        assert!(matches!(h.service.get_form(&form.id).await, Err(FormsError::FormNotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_valid_response() {
        let h = harness();
        let form = h
            .service
            .create_form(&Actor::user("ann"), CreateFormCommand { schema: contact_schema() })
            .await
            .unwrap();

        let mut answers: AnswerMap = [("name", "Ann"), ("email", "ann@x.com")].into_iter().collect();
        answers.set(FieldId::from("outro"), "ignored");
        let command = SubmitResponseCommand::new(form.id.clone(), answers).with_embed(EmbedContext {
            user_company: Some("Acme".into()),
            ..Default::default()
        });

        let outcome = h.service.submit_response(command).await.unwrap();
        assert!(outcome.is_accepted());

        let stored = h.submissions.for_form(&form.id);
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].answers.contains(&FieldId::from("outro")));
        assert_eq!(stored[0].metadata["userCompany"], "Acme");
        assert!(h.analytics.event_types().contains(&"submission.accepted"));
    }

    #[tokio::test]
    async fn test_submit_invalid_response_is_not_forwarded() {
        let h = harness();
        let form = h
            .service
            .create_form(&Actor::user("ann"), CreateFormCommand { schema: contact_schema() })
            .await
            .unwrap();

        let answers: AnswerMap = [("email", "ann@x.com")].into_iter().collect();
        let outcome = h.service.submit_response(SubmitResponseCommand::new(form.id.clone(), answers)).await.unwrap();

        match outcome {
            SubmissionOutcome::Rejected { report } => {
                assert_eq!(report.errors.keys().collect::<Vec<_>>(), vec![&FieldId::from("name")]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(h.submissions.for_form(&form.id).is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_surfaces_as_retryable() {
        let h = harness();
        let form = h
            .service
            .create_form(&Actor::user("ann"), CreateFormCommand { schema: contact_schema() })
            .await
            .unwrap();
        h.submissions.set_unavailable(true);

        let answers: AnswerMap = [("name", "Ann"), ("email", "ann@x.com")].into_iter().collect();
        let err = h.service.submit_response(SubmitResponseCommand::new(form.id, answers)).await.unwrap_err();
        assert!(matches!(err, FormsError::SubmissionFailed(_)));
        assert!(err.is_retryable());
        assert!(h.analytics.event_types().contains(&"submission.failed"));
    }

    #[tokio::test]
    async fn test_render_stored_form() {
        let h = harness();
        let form = h
            .service
            .create_form(&Actor::user("ann"), CreateFormCommand { schema: contact_schema() })
            .await
            .unwrap();

        let rendered = h.service.render_form(&form.id, RenderMode::Fill).await.unwrap();
        assert_eq!(rendered.fields().len(), 4);
        assert!(rendered.submit.disabled);
    }
}
