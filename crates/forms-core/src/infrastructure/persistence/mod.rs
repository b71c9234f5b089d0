//! In-memory persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::domain::aggregates::Form;
use crate::domain::value_objects::{AnswerMap, FormId, OwnerId};
use crate::ports::outbound::{FormRepository, RepositoryError, SubmissionGateway};

/// Form store with a unique title index
#[derive(Default)]
pub struct InMemoryFormRepository {
    forms: DashMap<FormId, Form>,
    /// Normalised title -> form id
    titles: DashMap<String, FormId>,
}

impl InMemoryFormRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    fn title_key(title: &str) -> String {
        title.trim().to_lowercase()
    }

    /// Claim `title` for `id`; a title held by another form is a conflict
    fn claim_title(&self, title: &str, id: &FormId) -> Result<(), RepositoryError> {
        match self.titles.entry(Self::title_key(title)) {
            Entry::Occupied(entry) if entry.get() != id => Err(RepositoryError::DuplicateTitle(title.to_string())),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(id.clone());
                Ok(())
            }
        }
    }

    fn release_title(&self, title: &str, id: &FormId) {
        self.titles.remove_if(&Self::title_key(title), |_, owner| owner == id);
    }

    fn check_scope(form: &Form, owner: Option<&OwnerId>) -> Result<(), RepositoryError> {
        match owner {
            Some(owner) if !form.is_owned_by(owner) => Err(RepositoryError::NotFound(form.id.clone())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn create(&self, form: &Form) -> Result<(), RepositoryError> {
        self.claim_title(form.title(), &form.id)?;
        self.forms.insert(form.id.clone(), form.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, RepositoryError> {
        Ok(self.forms.get(id).map(|f| f.value().clone()))
    }

    async fn update(&self, form: &Form, owner: Option<&OwnerId>) -> Result<(), RepositoryError> {
        let previous_title = {
            let stored = self.forms.get(&form.id).ok_or_else(|| RepositoryError::NotFound(form.id.clone()))?;
            Self::check_scope(stored.value(), owner)?;
            stored.title().to_string()
        };

        if Self::title_key(&previous_title) != Self::title_key(form.title()) {
            self.claim_title(form.title(), &form.id)?;
            self.release_title(&previous_title, &form.id);
        }
        self.forms.insert(form.id.clone(), form.clone());
        Ok(())
    }

    async fn delete(&self, id: &FormId, owner: Option<&OwnerId>) -> Result<(), RepositoryError> {
        let removed = self
            .forms
            .remove_if(id, |_, form| owner.map(|o| form.is_owned_by(o)).unwrap_or(true));
        match removed {
            Some((_, form)) => {
                self.release_title(form.title(), id);
                Ok(())
            }
            None => Err(RepositoryError::NotFound(id.clone())),
        }
    }

    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Form>, RepositoryError> {
        let mut forms: Vec<Form> = self
            .forms
            .iter()
            .filter(|f| f.is_owned_by(owner))
            .map(|f| f.value().clone())
            .collect();
        forms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(forms)
    }
}

/// One stored response
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubmission {
    pub id: String,
    pub form_id: FormId,
    pub answers: AnswerMap,
    pub metadata: Map<String, Value>,
    pub received_at: DateTime<Utc>,
}

/// Submission sink that keeps every response in memory
#[derive(Default)]
pub struct InMemorySubmissionStore {
    submissions: RwLock<Vec<StoredSubmission>>,
    unavailable: AtomicBool,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every submit fails while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn for_form(&self, form_id: &FormId) -> Vec<StoredSubmission> {
        self.submissions.read().iter().filter(|s| &s.form_id == form_id).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.submissions.read().len()
    }
}

#[async_trait]
impl SubmissionGateway for InMemorySubmissionStore {
    async fn submit(
        &self,
        form_id: &FormId,
        answers: &AnswerMap,
        metadata: &Map<String, Value>,
    ) -> Result<String, RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("submission store unavailable".into()));
        }
        let submission = StoredSubmission {
            id: Uuid::new_v4().to_string(),
            form_id: form_id.clone(),
            answers: answers.clone(),
            metadata: metadata.clone(),
            received_at: Utc::now(),
        };
        let id = submission.id.clone();
        self.submissions.write().push(submission);
        Ok(id)
    }
}
