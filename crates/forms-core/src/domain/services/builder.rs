//! Schema builder
//!
//! Mutation API over a form schema. Every operation borrows the input schema
//! and returns a new one; grid placement is re-resolved after each change.

use std::collections::HashSet;

use crate::config::BuilderDefaults;
use crate::domain::aggregates::{FieldPatch, FieldSchema, FormSchema, GridLayout};
use crate::domain::services::layout;
use crate::domain::value_objects::{
    Cell, FieldId, FieldKind, FieldOption, Placement, PlacementMode, RowTemplate,
};
use crate::error::{FormsError, Result};

/// Direction for `move_option`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMove {
    Up,
    Down,
}

/// Pure mutation operations over `FormSchema`
#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    defaults: BuilderDefaults,
}

impl SchemaBuilder {
    pub fn new(defaults: BuilderDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &BuilderDefaults {
        &self.defaults
    }

    /// Fresh field of `kind` seeded with the configured defaults
    pub fn new_field(&self, kind: FieldKind) -> FieldSchema {
        FieldSchema::with_defaults(kind, &self.defaults)
    }

    // =========================================================================
    // Fields
    // =========================================================================

    /// Append a default field of `kind`. Grid forms need a free target cell.
    pub fn append_field(&self, schema: &FormSchema, kind: FieldKind, cell: Option<Cell>) -> Result<FormSchema> {
        self.insert_field(schema, self.new_field(kind), cell)
    }

    /// Append a caller-built field, enforcing id uniqueness and placement
    pub fn insert_field(&self, schema: &FormSchema, mut field: FieldSchema, cell: Option<Cell>) -> Result<FormSchema> {
        if schema.field(&field.id).is_some() {
            return Err(FormsError::InvalidSchema(format!("duplicate field id {}", field.id)));
        }
        field.sanitize(&self.defaults);

        let mut next = schema.clone();
        match (&next.grid, cell) {
            (Some(grid), Some(cell)) => {
                if !grid.contains(cell) {
                    return Err(FormsError::CellNotFound { row: cell.row, col: cell.col });
                }
                if next.is_occupied(cell) {
                    return Err(FormsError::CellOccupied { row: cell.row, col: cell.col });
                }
                field.placement = Some(Placement::grid(cell));
            }
            (Some(_), None) => {
                return Err(FormsError::InvalidSchema("grid forms require a target cell".into()));
            }
            (None, _) => {
                if matches!(field.placement, Some(Placement::Grid { .. })) {
                    field.placement = None;
                }
            }
        }

        tracing::debug!(field_id = %field.id, kind = %field.kind, "appending field");
        next.fields.push(field);
        Ok(self.settle(next))
    }

    /// Merge `patch` into the identified field
    pub fn update_field(&self, schema: &FormSchema, id: &FieldId, patch: FieldPatch) -> Result<FormSchema> {
        let mut next = schema.clone();
        let field = next.field_mut(id).ok_or_else(|| FormsError::FieldNotFound(id.clone()))?;
        if field.apply(patch, &self.defaults) {
            tracing::debug!(field_id = %id, kind = %field.kind, "field kind changed");
        }
        Ok(next)
    }

    /// Remove a field; unknown ids are a no-op
    pub fn remove_field(&self, schema: &FormSchema, id: &FieldId) -> FormSchema {
        let mut next = schema.clone();
        let before = next.fields.len();
        next.fields.retain(|f| &f.id != id);
        if next.fields.len() == before {
            tracing::debug!(field_id = %id, "remove ignored, field not found");
        }
        next
    }

    /// Reorder within the field sequence
    pub fn move_field(&self, schema: &FormSchema, from: usize, to: usize) -> Result<FormSchema> {
        let len = schema.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(FormsError::IndexOutOfRange { index, len });
            }
        }
        let mut next = schema.clone();
        if from != to {
            let field = next.fields.remove(from);
            next.fields.insert(to, field);
        }
        Ok(next)
    }

    /// Insert a copy with a fresh id next to the original
    pub fn duplicate_field(&self, schema: &FormSchema, id: &FieldId) -> Result<FormSchema> {
        let index = schema.position(id).ok_or_else(|| FormsError::FieldNotFound(id.clone()))?;
        let mut next = schema.clone();
        let mut copy = next.fields[index].clone();
        copy.id = FieldId::new();

        if let (Some(grid), Some(cell)) = (next.grid.clone(), copy.cell()) {
            let target = match layout::first_empty_cell(&grid, &next.fields, cell.row) {
                Some(target) => target,
                None => {
                    let grown = layout::add_row(&grid, Some(self.defaults.default_template.clone()));
                    let row = grown.len() - 1;
                    next.grid = Some(grown);
                    Cell::new(row, 0)
                }
            };
            copy.placement = Some(Placement::grid(target));
        }

        tracing::debug!(field_id = %id, copy_id = %copy.id, "duplicating field");
        next.fields.insert(index + 1, copy);
        Ok(self.settle(next))
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Append an option; `None` appends the next placeholder
    pub fn add_option(&self, schema: &FormSchema, id: &FieldId, option: Option<FieldOption>) -> Result<FormSchema> {
        self.with_options(schema, id, |options, prefix| {
            let option = option.unwrap_or_else(|| FieldOption::placeholder(prefix, options.len() + 1));
            options.push(option);
            Ok(())
        })
    }

    /// Remove the option at `index`; the last option of a choice field stays
    pub fn remove_option(&self, schema: &FormSchema, id: &FieldId, index: usize) -> Result<FormSchema> {
        self.with_options(schema, id, |options, _| {
            if index >= options.len() {
                return Err(FormsError::IndexOutOfRange { index, len: options.len() });
            }
            if options.len() == 1 {
                tracing::warn!(field_id = %id, "refusing to remove the only option");
                return Ok(());
            }
            options.remove(index);
            Ok(())
        })
    }

    /// Swap an option with its neighbour; moves past either end are no-ops
    pub fn move_option(&self, schema: &FormSchema, id: &FieldId, index: usize, direction: OptionMove) -> Result<FormSchema> {
        self.with_options(schema, id, |options, _| {
            if index >= options.len() {
                return Err(FormsError::IndexOutOfRange { index, len: options.len() });
            }
            match direction {
                OptionMove::Up if index > 0 => options.swap(index, index - 1),
                OptionMove::Down if index + 1 < options.len() => options.swap(index, index + 1),
                _ => {}
            }
            Ok(())
        })
    }

    pub fn update_option(&self, schema: &FormSchema, id: &FieldId, index: usize, option: FieldOption) -> Result<FormSchema> {
        self.with_options(schema, id, |options, _| {
            let len = options.len();
            let slot = options.get_mut(index).ok_or(FormsError::IndexOutOfRange { index, len })?;
            *slot = option;
            Ok(())
        })
    }

    fn with_options<F>(&self, schema: &FormSchema, id: &FieldId, edit: F) -> Result<FormSchema>
    where
        F: FnOnce(&mut Vec<FieldOption>, &str) -> Result<()>,
    {
        let mut next = schema.clone();
        let field = next.field_mut(id).ok_or_else(|| FormsError::FieldNotFound(id.clone()))?;
        if !field.kind.is_choice() {
            return Err(FormsError::InvalidSchema(format!("{} fields have no options", field.kind)));
        }
        edit(&mut field.options, &self.defaults.option_label_prefix)?;
        Ok(next)
    }

    // =========================================================================
    // Grid
    // =========================================================================

    /// Switch placement mode. Entering grid mode stacks the fields one per
    /// row; leaving it keeps the render order as the flow order.
    pub fn set_mode(&self, schema: &FormSchema, mode: PlacementMode) -> FormSchema {
        if schema.mode() == mode {
            return schema.clone();
        }
        let mut next = schema.clone();
        match mode {
            PlacementMode::Grid => {
                let mut grid = GridLayout::new();
                for (row, field) in next.fields.iter_mut().enumerate() {
                    grid = layout::add_row(&grid, Some(RowTemplate::single()));
                    field.placement = Some(Placement::grid(Cell::new(row, 0)));
                }
                next.grid = Some(grid);
            }
            PlacementMode::Flow => {
                let order: Vec<FieldId> = schema.ordered_fields().iter().map(|f| f.id.clone()).collect();
                next.fields.sort_by_key(|f| order.iter().position(|id| id == &f.id));
                for field in next.fields.iter_mut() {
                    field.placement = None;
                }
                next.grid = None;
            }
        }
        tracing::debug!(mode = ?mode, "placement mode changed");
        next
    }

    pub fn add_row(&self, schema: &FormSchema, template: Option<RowTemplate>) -> Result<FormSchema> {
        let grid = self.grid_of(schema)?;
        let template = template.unwrap_or_else(|| self.defaults.default_template.clone());
        let mut next = schema.clone();
        next.grid = Some(layout::add_row(grid, Some(template)));
        Ok(next)
    }

    /// Change a row's split; fields in cells that no longer exist move to
    /// free cells further down (new rows are appended as needed).
    pub fn set_row_template(&self, schema: &FormSchema, row: usize, template: RowTemplate) -> Result<FormSchema> {
        let grid = self.grid_of(schema)?;
        if row >= grid.len() {
            return Err(FormsError::RowNotFound(row));
        }
        let mut next = schema.clone();
        let mut grid = grid.clone();
        grid.rows[row].template = template;
        let cells = grid.rows[row].cell_count();

        let orphans: Vec<usize> = next
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.cell().map(|c| c.row == row && c.col >= cells).unwrap_or(false))
            .map(|(i, _)| i)
            .collect();
        for index in orphans {
            next.fields[index].placement = None;
            let target = match (row..grid.len()).find_map(|r| layout::first_empty_cell(&grid, &next.fields, r)) {
                Some(cell) => cell,
                None => {
                    grid = layout::add_row(&grid, Some(self.defaults.default_template.clone()));
                    Cell::new(grid.len() - 1, 0)
                }
            };
            tracing::debug!(field_id = %next.fields[index].id, to = %target, "relocating field out of removed cell");
            next.fields[index].placement = Some(Placement::grid(target));
        }
        next.grid = Some(grid);
        Ok(next)
    }

    /// Remove a row together with the fields that occupied it
    pub fn delete_row(&self, schema: &FormSchema, row: usize) -> Result<FormSchema> {
        let grid = self.grid_of(schema)?;
        let deletion = layout::delete_row(grid, &schema.fields, row)?;
        let mut next = schema.clone();
        next.grid = Some(deletion.layout);
        next.fields = deletion.fields;
        next.fields.retain(|f| !deletion.unplaced.contains(&f.id));
        Ok(next)
    }

    /// Drag the field at `source` onto `destination`
    pub fn drop_field(&self, schema: &FormSchema, source: Cell, destination: Cell) -> Result<FormSchema> {
        let grid = self.grid_of(schema)?;
        let outcome = layout::resolve_drop(grid, &schema.fields, source, destination)?;
        let mut next = schema.clone();
        next.grid = Some(outcome.layout);
        next.fields = outcome.fields;
        Ok(next)
    }

    /// Normalize a schema loaded from storage: sanitize fields, pad rows and
    /// split fields sharing a cell
    pub fn hydrate(&self, mut schema: FormSchema) -> FormSchema {
        for field in schema.fields.iter_mut() {
            field.sanitize(&self.defaults);
        }
        let schema = self.settle(schema);
        self.separate_shared_cells(schema)
    }

    /// The earliest field keeps a contested cell. Later claimants move to the
    /// first empty cell of the same row, or to a new row.
    fn separate_shared_cells(&self, mut schema: FormSchema) -> FormSchema {
        let Some(mut grid) = schema.grid.clone() else {
            return schema;
        };
        let mut claimed = HashSet::new();
        for index in 0..schema.fields.len() {
            let Some(cell) = schema.fields[index].cell() else {
                continue;
            };
            if !grid.contains(cell) || claimed.insert(cell) {
                continue;
            }
            schema.fields[index].placement = None;
            let target = match layout::first_empty_cell(&grid, &schema.fields, cell.row) {
                Some(target) => target,
                None => {
                    grid = layout::add_row(&grid, Some(self.defaults.default_template.clone()));
                    Cell::new(grid.len() - 1, 0)
                }
            };
            tracing::warn!(field_id = %schema.fields[index].id, from = %cell, to = %target, "relocating field out of shared cell");
            schema.fields[index].placement = Some(Placement::grid(target));
            claimed.insert(target);
        }
        schema.grid = Some(grid);
        schema
    }

    fn grid_of<'a>(&self, schema: &'a FormSchema) -> Result<&'a GridLayout> {
        schema
            .grid
            .as_ref()
            .ok_or_else(|| FormsError::InvalidSchema("form is not in grid mode".into()))
    }

    fn settle(&self, mut schema: FormSchema) -> FormSchema {
        if let Some(grid) = &schema.grid {
            schema.grid = Some(layout::ensure_row_count(grid, &schema.fields));
        }
        schema
    }
}
