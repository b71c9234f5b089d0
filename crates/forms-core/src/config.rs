//! Form builder configuration

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{HeadingLevel, RowTemplate};
use crate::error::{FormsError, Result};

/// Top-level configuration for the form builder core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Defaults applied to newly created fields and rows
    pub builder: BuilderDefaults,
    /// Validation message settings
    pub validation: ValidationOptions,
}

impl FormsConfig {
    /// Load from a JSON document
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| FormsError::Config(e.to_string()))
    }

    /// Load from a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FormsError::Config(e.to_string()))
    }

    /// Load from a file, picking the format from its extension
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| FormsError::Config(e.to_string()))?;
        if path.ends_with(".json") {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
    }
}

/// Kind-specific defaults for fresh fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderDefaults {
    /// Number of placeholder options seeded into a new choice field
    pub seed_option_count: usize,
    /// Label prefix of seeded options ("Option 1", "Option 2", ...)
    pub option_label_prefix: String,
    pub image_placeholder_url: String,
    pub image_width: u32,
    pub image_height: u32,
    pub heading_level: HeadingLevel,
    /// Template used by `add_row` when none is given
    pub default_template: RowTemplate,
}

impl Default for BuilderDefaults {
    fn default() -> Self {
        Self {
            seed_option_count: 3,
            option_label_prefix: "Option".into(),
            image_placeholder_url: "https://placehold.co/600x400".into(),
            image_width: 600,
            image_height: 400,
            heading_level: HeadingLevel::H2,
            default_template: RowTemplate::single(),
        }
    }
}

/// Message settings for the validation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Appended to the label for missing required answers
    pub required_suffix: String,
    pub pattern_message: String,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            required_suffix: "is required".into(),
            pattern_message: "Invalid format".into(),
        }
    }
}
