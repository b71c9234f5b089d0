//! Outbound ports
//!
//! Persistence, submission and analytics collaborators. Infrastructure
//! provides the implementations.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::aggregates::Form;
use crate::domain::value_objects::{AnswerMap, FormId, OwnerId};
use crate::domain::DomainEvent;

/// Form repository port
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Insert a new form; titles are unique
    async fn create(&self, form: &Form) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, RepositoryError>;

    /// Replace a stored form. With `owner` set the update only matches a
    /// form owned by that actor.
    async fn update(&self, form: &Form, owner: Option<&OwnerId>) -> Result<(), RepositoryError>;

    /// Delete a form, scoped to `owner` when given
    async fn delete(&self, id: &FormId, owner: Option<&OwnerId>) -> Result<(), RepositoryError>;

    /// Forms of one owner, most recently updated first
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Form>, RepositoryError>;
}

/// Submission collaborator
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Store one response; returns the submission id
    async fn submit(
        &self,
        form_id: &FormId,
        answers: &AnswerMap,
        metadata: &Map<String, Value>,
    ) -> Result<String, RepositoryError>;
}

/// Analytics service with an explicit lifecycle
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn init(&self) -> Result<(), RepositoryError>;

    async fn capture(&self, event: &DomainEvent);

    /// Flush buffered events
    async fn shutdown(&self) -> Result<(), RepositoryError>;
}

/// Repository error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("duplicate title: {0}")]
    DuplicateTitle(String),

    #[error("form not found: {0}")]
    NotFound(FormId),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
