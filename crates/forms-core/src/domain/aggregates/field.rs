//! Field schema
//!
//! Typed description of one form block. Construction never fails: every
//! kind gets a valid, if minimal, schema seeded with kind-specific defaults.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::BuilderDefaults;
use crate::domain::value_objects::{
    AnswerValue, Cell, ColumnWidth, FieldId, FieldKind, FieldOption, FieldValidation, HeadingLevel,
    ImageAlignment, ImagePosition, ImageSettings, ImageSize, Placement,
};

/// One form field/block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub id: FieldId,
    #[serde(alias = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<AnswerValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<HeadingLevel>,
    #[serde(flatten)]
    pub image: ImageSettings,
    #[serde(flatten)]
    pub placement: Option<Placement>,
}

impl FieldSchema {
    /// New field with the built-in defaults
    pub fn new(kind: FieldKind) -> Self {
        Self::with_defaults(kind, &BuilderDefaults::default())
    }

    /// New field seeded from configurable defaults
    pub fn with_defaults(kind: FieldKind, defaults: &BuilderDefaults) -> Self {
        let mut field = Self {
            id: FieldId::new(),
            kind,
            label: kind.display_name().to_string(),
            placeholder: None,
            help_text: None,
            default_value: None,
            required: false,
            options: Vec::new(),
            validation: None,
            heading_level: None,
            image: ImageSettings::default(),
            placement: None,
        };

        match kind {
            FieldKind::Select | FieldKind::Checkbox | FieldKind::Radio => {
                field.options =
                    FieldOption::seed(&defaults.option_label_prefix, defaults.seed_option_count);
            }
            FieldKind::Image => field.image = placeholder_image(defaults),
            FieldKind::Heading => field.heading_level = Some(defaults.heading_level),
            _ => {}
        }

        field
    }

    // =========================================================================
    // Construction helpers
    // =========================================================================

    pub fn labeled(kind: FieldKind, label: impl Into<String>) -> Self {
        let mut field = Self::new(kind);
        field.label = label.into();
        field
    }

    pub fn with_id(mut self, id: impl Into<FieldId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = !self.kind.is_static();
        self
    }

    pub fn with_options<O: Into<FieldOption>>(mut self, options: impl IntoIterator<Item = O>) -> Self {
        let options: Vec<FieldOption> = options.into_iter().map(Into::into).collect();
        if !self.kind.is_choice() || !options.is_empty() {
            self.options = options;
        }
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<AnswerValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn at(mut self, cell: Cell) -> Self {
        self.placement = Some(Placement::grid(cell));
        self
    }

    pub fn with_width(mut self, column_width: ColumnWidth) -> Self {
        self.placement = Some(Placement::Flow { column_width });
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Renders as the image alone
    pub fn is_image_only(&self) -> bool {
        self.kind == FieldKind::Image && self.image.is_full_field()
    }

    /// Whether the field binds a key in the answer map
    pub fn accepts_input(&self) -> bool {
        !self.kind.is_static() && !self.is_image_only()
    }

    /// `required` only means something on answer-collecting fields
    pub fn is_required(&self) -> bool {
        self.required && self.accepts_input()
    }

    pub fn cell(&self) -> Option<Cell> {
        self.placement.and_then(|p| p.cell())
    }

    pub fn column_width(&self) -> ColumnWidth {
        match self.placement {
            Some(Placement::Flow { column_width }) => column_width,
            _ => ColumnWidth::Full,
        }
    }

    pub fn validation(&self) -> Option<&FieldValidation> {
        self.validation.as_ref()
    }

    pub fn custom_message(&self) -> Option<&str> {
        self.validation.as_ref().and_then(|v| v.custom_message.as_deref())
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Merge a partial update. Returns `true` when the kind changed.
    pub fn apply(&mut self, patch: FieldPatch, defaults: &BuilderDefaults) -> bool {
        let kind_changed = patch.kind.map(|k| k != self.kind).unwrap_or(false);
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(placeholder) = patch.placeholder {
            self.placeholder = placeholder;
        }
        if let Some(help_text) = patch.help_text {
            self.help_text = help_text;
        }
        if let Some(default_value) = patch.default_value {
            self.default_value = default_value;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(options) = patch.options {
            if options.is_empty() && self.kind.is_choice() && !self.options.is_empty() {
                tracing::warn!(field_id = %self.id, "ignoring update that would clear choice options");
            } else {
                self.options = options;
            }
        }
        if let Some(validation) = patch.validation {
            self.validation = validation;
        }
        if let Some(heading_level) = patch.heading_level {
            self.heading_level = heading_level;
        }
        patch.image.merge_into(&mut self.image);
        if let Some(column_width) = patch.column_width {
            match self.placement {
                Some(Placement::Grid { .. }) => {
                    tracing::warn!(field_id = %self.id, "ignoring column width on a grid-placed field");
                }
                _ => self.placement = Some(Placement::Flow { column_width }),
            }
        }
        self.sanitize(defaults);
        kind_changed
    }

    /// Drop attributes the current kind does not accept and restore the
    /// per-kind invariants.
    pub fn sanitize(&mut self, defaults: &BuilderDefaults) {
        if self.kind == FieldKind::Image && !self.image.has_image() {
            let seeded = placeholder_image(defaults);
            let image = &mut self.image;
            image.url = seeded.url;
            image.width = image.width.or(seeded.width);
            image.height = image.height.or(seeded.height);
            image.alt = image.alt.take().or(seeded.alt);
            image.alignment = image.alignment.or(seeded.alignment);
            image.full_field = image.full_field.or(seeded.full_field);
        }

        if self.kind.is_choice() {
            if self.options.is_empty() {
                tracing::warn!(field_id = %self.id, kind = %self.kind, "seeding options for choice field");
                self.options =
                    FieldOption::seed(&defaults.option_label_prefix, defaults.seed_option_count);
            }
        } else {
            self.options.clear();
        }

        if self.kind == FieldKind::Heading {
            self.heading_level.get_or_insert(defaults.heading_level);
        } else {
            self.heading_level = None;
        }

        if !self.accepts_input() {
            self.placeholder = None;
            self.help_text = None;
            self.default_value = None;
            self.required = false;
        }

        let accepts_input = self.accepts_input();
        if let Some(validation) = self.validation.as_mut() {
            validation.retain_for(self.kind.is_numeric(), self.kind.is_text_like());
            let keeps_message = validation.custom_message.is_some() && accepts_input;
            if validation.is_empty() || (!keeps_message && validation_is_message_only(validation)) {
                self.validation = None;
            }
        }
    }
}

fn placeholder_image(defaults: &BuilderDefaults) -> ImageSettings {
    ImageSettings {
        url: Some(defaults.image_placeholder_url.clone()),
        width: Some(defaults.image_width),
        height: Some(defaults.image_height),
        alt: Some("Image".into()),
        alignment: Some(ImageAlignment::Center),
        full_field: Some(true),
        ..Default::default()
    }
}

fn validation_is_message_only(validation: &FieldValidation) -> bool {
    FieldValidation { custom_message: None, ..validation.clone() }.is_empty()
}

/// Partial update of a field. `Some(None)` clears an optional attribute.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, alias = "type")]
    pub kind: Option<FieldKind>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub placeholder: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub help_text: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub default_value: Option<Option<AnswerValue>>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, deserialize_with = "double_option")]
    pub validation: Option<Option<FieldValidation>>,
    #[serde(default, deserialize_with = "double_option")]
    pub heading_level: Option<Option<HeadingLevel>>,
    /// Flow-mode width; ignored for grid-placed fields
    #[serde(default)]
    pub column_width: Option<ColumnWidth>,
    #[serde(flatten)]
    pub image: ImagePatch,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self { label: Some(label.into()), ..Default::default() }
    }

    pub fn kind(kind: FieldKind) -> Self {
        Self { kind: Some(kind), ..Default::default() }
    }

    pub fn options<O: Into<FieldOption>>(options: impl IntoIterator<Item = O>) -> Self {
        Self { options: Some(options.into_iter().map(Into::into).collect()), ..Default::default() }
    }

    pub fn required(required: bool) -> Self {
        Self { required: Some(required), ..Default::default() }
    }

    pub fn column_width(column_width: ColumnWidth) -> Self {
        Self { column_width: Some(column_width), ..Default::default() }
    }
}

/// Partial update of the `image*` attributes, merged key by key
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ImagePatch {
    #[serde(rename = "imageUrl", alias = "imageSrc", default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    #[serde(rename = "imageWidth", default, deserialize_with = "double_option")]
    pub width: Option<Option<u32>>,
    #[serde(rename = "imageHeight", default, deserialize_with = "double_option")]
    pub height: Option<Option<u32>>,
    #[serde(rename = "imageAlt", default, deserialize_with = "double_option")]
    pub alt: Option<Option<String>>,
    #[serde(rename = "imageCaption", default, deserialize_with = "double_option")]
    pub caption: Option<Option<String>>,
    #[serde(rename = "imageAlignment", default, deserialize_with = "double_option")]
    pub alignment: Option<Option<ImageAlignment>>,
    #[serde(rename = "imageBorder", default, deserialize_with = "double_option")]
    pub border: Option<Option<bool>>,
    #[serde(rename = "imageBorderRadius", default, deserialize_with = "double_option")]
    pub border_radius: Option<Option<u32>>,
    #[serde(rename = "imageFullField", default, deserialize_with = "double_option")]
    pub full_field: Option<Option<bool>>,
    #[serde(rename = "imagePosition", default, deserialize_with = "double_option")]
    pub position: Option<Option<ImagePosition>>,
    #[serde(rename = "imageSize", default, deserialize_with = "double_option")]
    pub size: Option<Option<ImageSize>>,
}

impl ImagePatch {
    pub fn merge_into(self, image: &mut ImageSettings) {
        fn merge<T>(slot: &mut Option<T>, update: Option<Option<T>>) {
            if let Some(value) = update {
                *slot = value;
            }
        }
        merge(&mut image.url, self.url);
        merge(&mut image.width, self.width);
        merge(&mut image.height, self.height);
        merge(&mut image.alt, self.alt);
        merge(&mut image.caption, self.caption);
        merge(&mut image.alignment, self.alignment);
        merge(&mut image.border, self.border);
        merge(&mut image.border_radius, self.border_radius);
        merge(&mut image.full_field, self.full_field);
        merge(&mut image.position, self.position);
        merge(&mut image.size, self.size);
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_fields_are_seeded() {
        for kind in [FieldKind::Select, FieldKind::Checkbox, FieldKind::Radio] {
            let field = FieldSchema::new(kind);
            assert_eq!(field.options.len(), 3);
            assert_eq!(field.options[0].label, "Option 1");
        }
        assert!(FieldSchema::new(FieldKind::Text).options.is_empty());
    }

    #[test]
    fn test_image_and_heading_defaults() {
        let image = FieldSchema::new(FieldKind::Image);
        assert!(image.image.has_image());
        assert!(image.is_image_only());
        assert!(!image.accepts_input());
        assert_eq!(image.image.width, Some(600));

        let heading = FieldSchema::new(FieldKind::Heading);
        assert_eq!(heading.heading_level, Some(HeadingLevel::H2));
        assert!(!heading.accepts_input());
    }

    #[test]
    fn test_every_kind_constructs() {
        for kind in FieldKind::ALL {
            let field = FieldSchema::new(kind);
            assert_eq!(field.kind, kind);
            assert!(!field.label.is_empty());
            assert_eq!(field.kind.is_choice(), !field.options.is_empty());
        }
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(FieldSchema::new(FieldKind::Text).id, FieldSchema::new(FieldKind::Text).id);
    }

    #[test]
    fn test_kind_change_strips_attributes() {
        let defaults = BuilderDefaults::default();
        let mut field = FieldSchema::labeled(FieldKind::Select, "Topic").required();
        let changed = field.apply(FieldPatch::kind(FieldKind::Heading), &defaults);

        assert!(changed);
        assert!(field.options.is_empty());
        assert!(!field.required);
        assert_eq!(field.heading_level, Some(HeadingLevel::H2));
    }

    #[test]
    fn test_kind_change_into_choice_seeds_options() {
        let defaults = BuilderDefaults::default();
        let mut field = FieldSchema::labeled(FieldKind::Text, "Topic");
        field.apply(FieldPatch::kind(FieldKind::Radio), &defaults);
        assert_eq!(field.options.len(), 3);
    }

    #[test]
    fn test_clearing_choice_options_keeps_previous() {
        let defaults = BuilderDefaults::default();
        let mut field = FieldSchema::labeled(FieldKind::Select, "Topic").with_options(["Sales", "Support"]);
        field.apply(FieldPatch::options(Vec::<FieldOption>::new()), &defaults);
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.options[1].value, "Support");
    }

    #[test]
    fn test_kind_change_into_image_seeds_placeholder() {
        let defaults = BuilderDefaults::default();
        let mut field = FieldSchema::labeled(FieldKind::Text, "Banner").with_placeholder("Type here").required();
        field.image.width = Some(120);
        field.apply(FieldPatch::kind(FieldKind::Image), &defaults);

        assert_eq!(field.image.url.as_deref(), Some(defaults.image_placeholder_url.as_str()));
        assert_eq!(field.image.width, Some(120));
        assert!(field.is_image_only());
        assert!(field.placeholder.is_none());
        assert!(!field.required);
    }

    #[test]
    fn test_image_patch_merges_key_by_key() {
        let mut image = FieldSchema::new(FieldKind::Image).image;
        let patch: ImagePatch =
            serde_json::from_str(r#"{"imageSrc": "/hero.png", "imageWidth": null, "imageSize": "large"}"#).unwrap();
        patch.merge_into(&mut image);

        assert_eq!(image.url.as_deref(), Some("/hero.png"));
        assert!(image.width.is_none());
        assert_eq!(image.size, Some(ImageSize::Large));
        assert_eq!(image.height, Some(400));
        assert_eq!(image.full_field, Some(true));
    }

    #[test]
    fn test_validation_stripped_for_kind() {
        let defaults = BuilderDefaults::default();
        let mut field = FieldSchema::labeled(FieldKind::Text, "Code")
            .with_validation(FieldValidation::pattern("^[0-9]+$"));
        field.apply(FieldPatch::kind(FieldKind::Number), &defaults);
        assert!(field.validation.is_none());
    }

    #[test]
    fn test_patch_wire_format_clears_with_null() {
        let patch: FieldPatch =
            serde_json::from_str(r#"{"placeholder": null, "label": "Name"}"#).unwrap();
        assert_eq!(patch.placeholder, Some(None));
        assert_eq!(patch.help_text, None);

        let mut field = FieldSchema::labeled(FieldKind::Text, "x").with_placeholder("Your name");
        field.apply(patch, &BuilderDefaults::default());
        assert_eq!(field.placeholder, None);
        assert_eq!(field.label, "Name");
    }

    #[test]
    fn test_wire_format() {
        let field = FieldSchema::labeled(FieldKind::Number, "Age")
            .with_id("age")
            .required()
            .with_validation(FieldValidation::bounds(Some(18.0), None))
            .at(Cell::new(1, 0));
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["kind"], "number");
        assert_eq!(json["rowIndex"], 1);
        assert_eq!(json["colIndex"], 0);
        assert_eq!(json["validation"]["min"], 18.0);
        assert!(json.get("options").is_none());

        let back: FieldSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_legacy_block_shape() {
        let field: FieldSchema = serde_json::from_str(
            r#"{"id": "t", "type": "tel", "label": "Phone", "options": [], "columnWidth": "1/2", "imageSrc": "/p.png", "imagePosition": "right"}"#,
        )
        .unwrap();
        assert_eq!(field.kind, FieldKind::Phone);
        assert_eq!(field.column_width(), ColumnWidth::Half);
        assert_eq!(field.image.url.as_deref(), Some("/p.png"));
        assert!(field.accepts_input());
    }
}
