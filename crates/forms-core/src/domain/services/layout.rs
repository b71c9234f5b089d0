//! Layout resolver
//!
//! Keeps the grid row list and the fields' `(rowIndex, colIndex)` placements
//! consistent. All operations are pure: inputs are borrowed, results are new
//! values.

use std::collections::HashSet;

use crate::domain::aggregates::{FieldSchema, GridLayout, Row};
use crate::domain::value_objects::{Cell, FieldId, Placement, RowTemplate};
use crate::error::{FormsError, Result};

/// A field that changed cells as a side effect of a layout operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reassignment {
    pub field_id: FieldId,
    pub from: Option<Cell>,
    pub to: Option<Cell>,
}

/// Result of removing a row
#[derive(Clone, Debug, PartialEq)]
pub struct RowDeletion {
    pub layout: GridLayout,
    /// All input fields; those that sat in the deleted row are unplaced
    pub fields: Vec<FieldSchema>,
    /// Fields that occupied the deleted row
    pub unplaced: Vec<FieldId>,
    /// Fields shifted up by one row
    pub reassignments: Vec<Reassignment>,
}

/// Result of dropping a field onto a cell
#[derive(Clone, Debug, PartialEq)]
pub struct DropOutcome {
    pub layout: GridLayout,
    pub fields: Vec<FieldSchema>,
    pub moves: Vec<Reassignment>,
}

/// Append a row; `None` uses the single full-width template
pub fn add_row(layout: &GridLayout, template: Option<RowTemplate>) -> GridLayout {
    let mut next = layout.clone();
    let template = template.unwrap_or_default();
    tracing::debug!(row = next.len(), template = %template, "adding grid row");
    next.rows.push(Row::new(template));
    next
}

/// Remove a row and close the gap it leaves
pub fn delete_row(layout: &GridLayout, fields: &[FieldSchema], row: usize) -> Result<RowDeletion> {
    if row >= layout.len() {
        return Err(FormsError::RowNotFound(row));
    }

    let mut next = layout.clone();
    next.rows.remove(row);

    let mut fields = fields.to_vec();
    let mut unplaced = Vec::new();
    let mut reassignments = Vec::new();

    for field in fields.iter_mut() {
        let Some(cell) = field.cell() else { continue };
        if cell.row == row {
            field.placement = None;
            unplaced.push(field.id.clone());
        } else if cell.row > row {
            let to = Cell::new(cell.row - 1, cell.col);
            field.placement = Some(Placement::grid(to));
            reassignments.push(Reassignment { field_id: field.id.clone(), from: Some(cell), to: Some(to) });
        }
    }

    tracing::debug!(row, unplaced = unplaced.len(), shifted = reassignments.len(), "deleted grid row");
    Ok(RowDeletion { layout: next, fields, unplaced, reassignments })
}

/// Pad the layout with single-column rows until every referenced row exists
pub fn ensure_row_count(layout: &GridLayout, fields: &[FieldSchema]) -> GridLayout {
    let needed = fields.iter().filter_map(|f| f.cell()).map(|c| c.row + 1).max().unwrap_or(0);
    let mut next = layout.clone();
    if needed > next.len() {
        tracing::debug!(from = next.len(), to = needed, "padding grid rows");
        next.rows.resize_with(needed, || Row::new(RowTemplate::single()));
    }
    next
}

/// First cell of `row` that no field occupies
pub fn first_empty_cell(layout: &GridLayout, fields: &[FieldSchema], row: usize) -> Option<Cell> {
    let occupied = occupied_cells(fields);
    let count = layout.row(row)?.cell_count();
    (0..count).map(|col| Cell::new(row, col)).find(|cell| !occupied.contains(cell))
}

/// Drag the field at `source` onto `destination`
pub fn resolve_drop(
    layout: &GridLayout,
    fields: &[FieldSchema],
    source: Cell,
    destination: Cell,
) -> Result<DropOutcome> {
    let dragged = fields
        .iter()
        .find(|f| f.cell() == Some(source))
        .map(|f| f.id.clone())
        .ok_or_else(|| FormsError::InvalidSchema(format!("no field at cell {}", source)))?;
    place_field(layout, fields, &dragged, destination)
}

/// Move a (possibly unplaced) field onto `destination`.
///
/// An occupant of the destination moves to the first empty cell of the same
/// row, or to the first cell of a newly appended row when the row is full.
pub fn place_field(
    layout: &GridLayout,
    fields: &[FieldSchema],
    field_id: &FieldId,
    destination: Cell,
) -> Result<DropOutcome> {
    if !layout.contains(destination) {
        return Err(FormsError::CellNotFound { row: destination.row, col: destination.col });
    }
    let index = fields
        .iter()
        .position(|f| &f.id == field_id)
        .ok_or_else(|| FormsError::FieldNotFound(field_id.clone()))?;

    let mut next_layout = layout.clone();
    let mut next_fields = fields.to_vec();
    let mut moves = Vec::new();

    let from = next_fields[index].cell();
    if from == Some(destination) {
        return Ok(DropOutcome { layout: next_layout, fields: next_fields, moves });
    }

    let occupant = next_fields
        .iter()
        .position(|f| f.cell() == Some(destination) && &f.id != field_id);

    next_fields[index].placement = Some(Placement::grid(destination));
    moves.push(Reassignment { field_id: field_id.clone(), from, to: Some(destination) });

    if let Some(occupant) = occupant {
        // Vacate the occupant before searching so its old cell is not counted
        let displaced_from = next_fields[occupant].cell();
        next_fields[occupant].placement = None;

        let target = match first_empty_cell(&next_layout, &next_fields, destination.row) {
            Some(cell) => cell,
            None => {
                next_layout = add_row(&next_layout, None);
                Cell::new(next_layout.len() - 1, 0)
            }
        };
        next_fields[occupant].placement = Some(Placement::grid(target));
        moves.push(Reassignment {
            field_id: next_fields[occupant].id.clone(),
            from: displaced_from,
            to: Some(target),
        });
    }

    tracing::debug!(field_id = %field_id, to = %destination, moves = moves.len(), "resolved drop");
    Ok(DropOutcome { layout: next_layout, fields: next_fields, moves })
}

fn occupied_cells(fields: &[FieldSchema]) -> HashSet<Cell> {
    fields.iter().filter_map(|f| f.cell()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::FieldKind;
    use proptest::prelude::*;

    fn text(id: &str, row: usize, col: usize) -> FieldSchema {
        FieldSchema::labeled(FieldKind::Text, id).with_id(id).at(Cell::new(row, col))
    }

    fn cell_of<'a>(fields: &'a [FieldSchema], id: &str) -> Option<Cell> {
        fields.iter().find(|f| f.id.as_str() == id).and_then(|f| f.cell())
    }

    #[test]
    fn test_add_row_default_template() {
        let layout = add_row(&GridLayout::new(), None);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.rows[0].template.name(), "1-column");

        let layout = add_row(&layout, Some(RowTemplate::parse("1-1-1").unwrap()));
        assert_eq!(layout.rows[1].cell_count(), 3);
    }

    #[test]
    fn test_delete_row_reindexes() {
        let layout = GridLayout::with_templates((0..4).map(|_| RowTemplate::single()));
        let fields = vec![text("a", 0, 0), text("b", 1, 0), text("c", 2, 0), text("d", 3, 0)];

        let outcome = delete_row(&layout, &fields, 1).unwrap();

        assert_eq!(outcome.layout.len(), 3);
        assert_eq!(outcome.unplaced, vec![FieldId::from("b")]);
        assert_eq!(cell_of(&outcome.fields, "a"), Some(Cell::new(0, 0)));
        assert_eq!(cell_of(&outcome.fields, "b"), None);
        assert_eq!(cell_of(&outcome.fields, "c"), Some(Cell::new(1, 0)));
        assert_eq!(cell_of(&outcome.fields, "d"), Some(Cell::new(2, 0)));
        assert_eq!(outcome.reassignments.len(), 2);
    }

    #[test]
    fn test_delete_missing_row() {
        let layout = GridLayout::with_templates([RowTemplate::single()]);
        assert_eq!(delete_row(&layout, &[], 3), Err(FormsError::RowNotFound(3)));
    }

    #[test]
    fn test_ensure_row_count_pads() {
        let fields = vec![text("a", 0, 0), text("b", 4, 0)];
        let layout = ensure_row_count(&GridLayout::with_templates([RowTemplate::columns(2)]), &fields);
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.rows[0].cell_count(), 2);
        assert_eq!(layout.rows[4].cell_count(), 1);

        let unchanged = ensure_row_count(&layout, &fields);
        assert_eq!(unchanged, layout);
    }

    #[test]
    fn test_drop_into_empty_cell() {
        let layout = GridLayout::with_templates([RowTemplate::columns(2), RowTemplate::single()]);
        let fields = vec![text("a", 0, 0), text("b", 1, 0)];

        let outcome = resolve_drop(&layout, &fields, Cell::new(1, 0), Cell::new(0, 1)).unwrap();
        assert_eq!(cell_of(&outcome.fields, "b"), Some(Cell::new(0, 1)));
        assert_eq!(outcome.layout.len(), 2);
        assert_eq!(outcome.moves.len(), 1);
    }

    #[test]
    fn test_drop_displaces_into_new_row_when_full() {
        let layout = GridLayout::with_templates([RowTemplate::columns(2), RowTemplate::single()]);
        let fields = vec![text("a", 0, 0), text("b", 0, 1), text("c", 1, 0)];

        let outcome = resolve_drop(&layout, &fields, Cell::new(1, 0), Cell::new(0, 0)).unwrap();

        assert_eq!(cell_of(&outcome.fields, "c"), Some(Cell::new(0, 0)));
        assert_eq!(cell_of(&outcome.fields, "b"), Some(Cell::new(0, 1)));
        assert_eq!(outcome.layout.len(), 3);
        assert_eq!(cell_of(&outcome.fields, "a"), Some(Cell::new(2, 0)));
    }

    #[test]
    fn test_drop_displaces_into_same_row_gap() {
        let layout = GridLayout::with_templates([RowTemplate::columns(3), RowTemplate::single()]);
        let fields = vec![text("a", 0, 0), text("b", 0, 1), text("c", 1, 0)];

        let outcome = resolve_drop(&layout, &fields, Cell::new(1, 0), Cell::new(0, 0)).unwrap();

        assert_eq!(cell_of(&outcome.fields, "c"), Some(Cell::new(0, 0)));
        assert_eq!(cell_of(&outcome.fields, "a"), Some(Cell::new(0, 2)));
        assert_eq!(outcome.layout.len(), 2);
    }

    #[test]
    fn test_drop_within_row_swaps() {
        let layout = GridLayout::with_templates([RowTemplate::columns(2)]);
        let fields = vec![text("a", 0, 0), text("b", 0, 1)];

        let outcome = resolve_drop(&layout, &fields, Cell::new(0, 1), Cell::new(0, 0)).unwrap();
        assert_eq!(cell_of(&outcome.fields, "b"), Some(Cell::new(0, 0)));
        assert_eq!(cell_of(&outcome.fields, "a"), Some(Cell::new(0, 1)));
    }

    #[test]
    fn test_drop_errors() {
        let layout = GridLayout::with_templates([RowTemplate::single()]);
        let fields = vec![text("a", 0, 0)];
        assert_eq!(
            resolve_drop(&layout, &fields, Cell::new(0, 0), Cell::new(0, 1)),
            Err(FormsError::CellNotFound { row: 0, col: 1 })
        );
        assert!(resolve_drop(&layout, &fields, Cell::new(5, 0), Cell::new(0, 0)).is_err());

        let same = resolve_drop(&layout, &fields, Cell::new(0, 0), Cell::new(0, 0)).unwrap();
        assert_eq!(same.fields, fields);
    }

    proptest! {
        #[test]
        fn prop_delete_row_keeps_rows_contiguous(rows in 1usize..8, victim in 0usize..8) {
            prop_assume!(victim < rows);
            let layout = GridLayout::with_templates((0..rows).map(|_| RowTemplate::single()));
            let fields: Vec<_> = (0..rows).map(|r| text(&format!("f{}", r), r, 0)).collect();

            let outcome = delete_row(&layout, &fields, victim).unwrap();

            let mut remaining: Vec<usize> = outcome.fields.iter().filter_map(|f| f.cell()).map(|c| c.row).collect();
            remaining.sort_unstable();
            prop_assert_eq!(remaining, (0..rows - 1).collect::<Vec<_>>());
            prop_assert_eq!(outcome.layout.len(), rows - 1);
        }

        #[test]
        fn prop_drop_never_shares_cells(cols in 1usize..4, src_row in 0usize..3, dst_col in 0usize..4) {
            prop_assume!(dst_col < cols);
            let layout = GridLayout::with_templates((0..3).map(|_| RowTemplate::columns(cols)));
            let mut fields = Vec::new();
            for row in 0..3 {
                for col in 0..cols {
                    fields.push(text(&format!("r{}c{}", row, col), row, col));
                }
            }

            let outcome = resolve_drop(&layout, &fields, Cell::new(src_row, 0), Cell::new(0, dst_col)).unwrap();
            let cells: Vec<_> = outcome.fields.iter().filter_map(|f| f.cell()).collect();
            let unique: HashSet<_> = cells.iter().copied().collect();
            prop_assert_eq!(cells.len(), unique.len());
            prop_assert_eq!(cells.len(), fields.len());
            for cell in cells {
                prop_assert!(outcome.layout.contains(cell));
            }
        }
    }
}
