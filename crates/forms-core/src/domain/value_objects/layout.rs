//! Layout value objects
//!
//! Placement of a field is either a grid cell `(rowIndex, colIndex)` or a
//! fractional column width in flow order. One form uses one mode.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{FormsError, Result};

/// Heading size for `heading` fields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    #[default]
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    pub fn level(&self) -> u8 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H3 => 3,
            Self::H4 => 4,
        }
    }
}

/// Fractional width of a field in flow mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColumnWidth {
    #[default]
    Full,
    Half,
    Third,
    TwoThirds,
    Quarter,
    ThreeQuarters,
}

impl ColumnWidth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "1",
            Self::Half => "1/2",
            Self::Third => "1/3",
            Self::TwoThirds => "2/3",
            Self::Quarter => "1/4",
            Self::ThreeQuarters => "3/4",
        }
    }

    pub fn fraction(&self) -> f32 {
        match self {
            Self::Full => 1.0,
            Self::Half => 0.5,
            Self::Third => 1.0 / 3.0,
            Self::TwoThirds => 2.0 / 3.0,
            Self::Quarter => 0.25,
            Self::ThreeQuarters => 0.75,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "1" | "full" => Some(Self::Full),
            "1/2" => Some(Self::Half),
            "1/3" => Some(Self::Third),
            "2/3" => Some(Self::TwoThirds),
            "1/4" => Some(Self::Quarter),
            "3/4" => Some(Self::ThreeQuarters),
            _ => None,
        }
    }
}

impl Serialize for ColumnWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Whole(u8),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Whole(1) => Ok(Self::Full),
            Repr::Whole(n) => Err(serde::de::Error::custom(format!("invalid column width {}", n))),
            Repr::Text(s) => Self::parse(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid column width {:?}", s))),
        }
    }
}

/// Address of one grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Where a field sits in its form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placement {
    #[serde(rename_all = "camelCase")]
    Grid { row_index: usize, col_index: usize },
    #[serde(rename_all = "camelCase")]
    Flow { column_width: ColumnWidth },
}

impl Placement {
    pub fn grid(cell: Cell) -> Self {
        Self::Grid { row_index: cell.row, col_index: cell.col }
    }

    pub fn cell(&self) -> Option<Cell> {
        match self {
            Self::Grid { row_index, col_index } => Some(Cell::new(*row_index, *col_index)),
            Self::Flow { .. } => None,
        }
    }

    pub fn mode(&self) -> PlacementMode {
        match self {
            Self::Grid { .. } => PlacementMode::Grid,
            Self::Flow { .. } => PlacementMode::Flow,
        }
    }
}

/// Layout strategy of a whole form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    #[default]
    Flow,
    Grid,
}

/// Named split of a grid row into cells, e.g. `2-column` or `2-1`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowTemplate {
    name: String,
    weights: Vec<u32>,
}

impl RowTemplate {
    const MAX_CELLS: usize = 6;
    const MAX_WEIGHT: u32 = 12;

    /// Parse `N-column` (equal cells) or a ratio like `2-1` / `1-1-1`
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        let invalid = || FormsError::InvalidSchema(format!("unknown row template {:?}", name));

        if let Some(count) = name.strip_suffix("-columns").or_else(|| name.strip_suffix("-column")) {
            let count: usize = count.parse().map_err(|_| invalid())?;
            if count == 0 || count > Self::MAX_CELLS {
                return Err(invalid());
            }
            return Ok(Self { name: format!("{}-column", count), weights: vec![1; count] });
        }

        let weights = name
            .split('-')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        if weights.len() < 2
            || weights.len() > Self::MAX_CELLS
            || weights.iter().any(|w| *w == 0 || *w > Self::MAX_WEIGHT)
        {
            return Err(invalid());
        }
        Ok(Self { name: name.to_string(), weights })
    }

    /// Parse, falling back to a single full-width cell
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|e| {
            tracing::warn!(template = name, error = %e, "falling back to 1-column template");
            Self::default()
        })
    }

    pub fn single() -> Self {
        Self { name: "1-column".into(), weights: vec![1] }
    }

    pub fn columns(count: usize) -> Self {
        Self::parse_or_default(&format!("{}-column", count))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell_count(&self) -> usize {
        self.weights.len()
    }

    /// Relative width of each cell, summing to 1
    pub fn fractions(&self) -> Vec<f32> {
        let total: u32 = self.weights.iter().sum();
        self.weights.iter().map(|w| *w as f32 / total as f32).collect()
    }
}

impl Default for RowTemplate {
    fn default() -> Self {
        Self::single()
    }
}

impl fmt::Display for RowTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Serialize for RowTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for RowTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse_or_default(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_templates() {
        let t = RowTemplate::parse("3-column").unwrap();
        assert_eq!(t.cell_count(), 3);
        assert!((t.fractions()[0] - 1.0 / 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ratio_templates() {
        let t = RowTemplate::parse("2-1").unwrap();
        assert_eq!(t.cell_count(), 2);
        assert_eq!(t.name(), "2-1");
        let fractions = t.fractions();
        assert!((fractions[0] - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(RowTemplate::parse("1-1-1").unwrap().cell_count(), 3);
    }

    #[test]
    fn test_malformed_template_falls_back() {
        assert!(RowTemplate::parse("banana").is_err());
        assert!(RowTemplate::parse("0-column").is_err());
        assert!(RowTemplate::parse("1").is_err());
        assert_eq!(RowTemplate::parse_or_default("banana"), RowTemplate::single());

        let t: RowTemplate = serde_json::from_str("\"7-9-x\"").unwrap();
        assert_eq!(t.name(), "1-column");
    }

    #[test]
    fn test_column_width_wire_format() {
        let w: ColumnWidth = serde_json::from_str("\"2/3\"").unwrap();
        assert_eq!(w, ColumnWidth::TwoThirds);
        let w: ColumnWidth = serde_json::from_str("1").unwrap();
        assert_eq!(w, ColumnWidth::Full);
        assert!(serde_json::from_str::<ColumnWidth>("\"5/7\"").is_err());
        assert_eq!(serde_json::to_string(&ColumnWidth::Quarter).unwrap(), "\"1/4\"");
    }

    #[test]
    fn test_placement_untagged() {
        let p: Placement = serde_json::from_str(r#"{"rowIndex": 2, "colIndex": 1}"#).unwrap();
        assert_eq!(p.cell(), Some(Cell::new(2, 1)));
        let p: Placement = serde_json::from_str(r#"{"columnWidth": "1/2"}"#).unwrap();
        assert_eq!(p.mode(), PlacementMode::Flow);
    }
}
