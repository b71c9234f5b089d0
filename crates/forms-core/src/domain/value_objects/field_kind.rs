//! Field kind
//!
//! Closed set of block types a form can be composed of.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a form field/block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Email,
    #[serde(alias = "tel")]
    Phone,
    Url,
    Password,
    Select,
    Checkbox,
    Radio,
    Date,
    Time,
    File,
    Range,
    Color,
    Heading,
    Paragraph,
    Divider,
    Image,
}

impl FieldKind {
    pub const ALL: [FieldKind; 19] = [
        Self::Text,
        Self::Textarea,
        Self::Number,
        Self::Email,
        Self::Phone,
        Self::Url,
        Self::Password,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Date,
        Self::Time,
        Self::File,
        Self::Range,
        Self::Color,
        Self::Heading,
        Self::Paragraph,
        Self::Divider,
        Self::Image,
    ];

    /// Kinds that require a non-empty option list
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Checkbox | Self::Radio)
    }

    /// Layout-only kinds: no answer, no `required`
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Heading | Self::Paragraph | Self::Divider)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }

    /// Kinds whose answer is free text and may carry length constraints
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Textarea | Self::Email | Self::Phone | Self::Url | Self::Password
        )
    }

    /// Whether answers are lists of option values
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Checkbox)
    }

    /// HTML-equivalent input type for single-line inputs
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Text | Self::Image => "text",
            Self::Email => "email",
            Self::Phone => "tel",
            Self::Url => "url",
            Self::Password => "password",
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::File => "file",
            Self::Range => "range",
            Self::Color => "color",
            Self::Textarea
            | Self::Select
            | Self::Checkbox
            | Self::Radio
            | Self::Heading
            | Self::Paragraph
            | Self::Divider => "none",
        }
    }

    /// Human-readable name, used as the label of a freshly added field
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Text => "Text Field",
            Self::Textarea => "Text Area",
            Self::Number => "Number",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Url => "URL",
            Self::Password => "Password",
            Self::Select => "Dropdown",
            Self::Checkbox => "Checkboxes",
            Self::Radio => "Multiple Choice",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::File => "File Upload",
            Self::Range => "Range",
            Self::Color => "Color",
            Self::Heading => "Heading",
            Self::Paragraph => "Paragraph",
            Self::Divider => "Divider",
            Self::Image => "Image",
        }
    }
}

impl FieldKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Url => "url",
            Self::Password => "password",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Date => "date",
            Self::Time => "time",
            Self::File => "file",
            Self::Range => "range",
            Self::Color => "color",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Divider => "divider",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
