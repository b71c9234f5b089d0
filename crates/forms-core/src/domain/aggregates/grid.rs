//! Grid layout
//!
//! Ordered rows, each split into cells by its template. A cell holds at most
//! one field; fields reference cells by `(rowIndex, colIndex)`.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Cell, RowTemplate};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub template: RowTemplate,
}

impl Row {
    pub fn new(template: RowTemplate) -> Self {
        Self { template }
    }

    pub fn cell_count(&self) -> usize {
        self.template.cell_count()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout with one row per template
    pub fn with_templates(templates: impl IntoIterator<Item = RowTemplate>) -> Self {
        Self { rows: templates.into_iter().map(Row::new).collect() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.rows.get(cell.row).map(|r| cell.col < r.cell_count()).unwrap_or(false)
    }

    /// Every cell address in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, r)| (0..r.cell_count()).map(move |col| Cell::new(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_row_major() {
        let grid = GridLayout::with_templates([RowTemplate::columns(2), RowTemplate::single()]);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells, vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 0)]);
        assert!(grid.contains(Cell::new(0, 1)));
        assert!(!grid.contains(Cell::new(1, 1)));
        assert!(!grid.contains(Cell::new(2, 0)));
    }
}
