//! Form schema aggregate
//!
//! Ordered collection of fields plus form metadata. Mutated through the
//! schema builder; a fill session works on its own copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::field::FieldSchema;
use super::grid::GridLayout;
use crate::domain::value_objects::{AnswerMap, Cell, FieldId, FormId, OwnerId, PlacementMode};
use crate::error::{FormsError, Result};

/// Form schema: metadata, fields and (in grid mode) the row layout
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    /// Theme, submit text, success message, redirect... passed through untouched
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridLayout>,
}

impl FormSchema {
    /// Empty flow-mode form
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    /// Empty grid-mode form with no rows
    pub fn with_grid(title: impl Into<String>) -> Self {
        Self { title: title.into(), grid: Some(GridLayout::new()), ..Default::default() }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mode(&self) -> PlacementMode {
        if self.grid.is_some() {
            PlacementMode::Grid
        } else {
            PlacementMode::Flow
        }
    }

    pub fn field(&self, id: &FieldId) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub(crate) fn field_mut(&mut self, id: &FieldId) -> Option<&mut FieldSchema> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    pub fn field_at(&self, cell: Cell) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.cell() == Some(cell))
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.field_at(cell).is_some()
    }

    /// Fields that bind an answer
    pub fn input_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.accepts_input())
    }

    /// Render order: array order in flow mode; `(row, col)` ascending in grid
    /// mode with array order as the tie-break and unplaced fields last.
    pub fn ordered_fields(&self) -> Vec<&FieldSchema> {
        let mut ordered: Vec<(usize, &FieldSchema)> = self.fields.iter().enumerate().collect();
        if self.grid.is_some() {
            ordered.sort_by_key(|(index, f)| {
                let cell = f.cell().unwrap_or(Cell::new(usize::MAX, usize::MAX));
                (cell.row, cell.col, *index)
            });
        }
        ordered.into_iter().map(|(_, f)| f).collect()
    }

    /// Fresh answer map seeded from each field's default value
    pub fn initial_answers(&self) -> AnswerMap {
        let mut answers = AnswerMap::new();
        for field in self.input_fields() {
            if let Some(value) = &field.default_value {
                answers.set(field.id.clone(), value.clone());
            }
        }
        answers
    }

    /// Check every data-model invariant
    pub fn check_invariants(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut cells = HashSet::new();

        for field in &self.fields {
            if !ids.insert(&field.id) {
                return Err(FormsError::InvalidSchema(format!("duplicate field id {}", field.id)));
            }
            if field.kind.is_choice() && field.options.is_empty() {
                return Err(FormsError::InvalidSchema(format!(
                    "choice field {} has no options",
                    field.id
                )));
            }
            if let Some(placement) = field.placement {
                if placement.mode() != self.mode() {
                    return Err(FormsError::InvalidSchema(format!(
                        "field {} uses {:?} placement in a {:?} form",
                        field.id,
                        placement.mode(),
                        self.mode()
                    )));
                }
            }
            if let (Some(grid), Some(cell)) = (&self.grid, field.cell()) {
                if !grid.contains(cell) {
                    return Err(FormsError::CellNotFound { row: cell.row, col: cell.col });
                }
                if !cells.insert(cell) {
                    return Err(FormsError::CellOccupied { row: cell.row, col: cell.col });
                }
            }
        }
        Ok(())
    }

    /// Title must be non-empty before the form can be stored
    pub fn check_persistable(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(FormsError::InvalidSchema("form title is required".into()));
        }
        self.check_invariants()
    }
}

/// Persisted form record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: FormId,
    pub owner_id: OwnerId,
    pub schema: FormSchema,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    pub fn create(owner_id: OwnerId, schema: FormSchema) -> Self {
        let now = Utc::now();
        Self { id: FormId::new(), owner_id, schema, created_at: now, updated_at: now }
    }

    pub fn id(&self) -> &FormId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.schema.title
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }

    pub fn replace_schema(&mut self, schema: FormSchema) {
        self.schema = schema;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
