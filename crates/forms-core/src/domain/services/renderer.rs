//! Dual-mode renderer
//!
//! Turns a form schema into a presentation tree. `edit` mode produces inert
//! previews built from the field's own attributes; `fill` mode binds every
//! input to the answer map and carries per-field errors. Both modes share
//! one widget dispatch over `FieldKind`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::BuilderDefaults;
use crate::domain::aggregates::{FieldSchema, FormSchema};
use crate::domain::value_objects::{
    AnswerMap, AnswerValue, Cell, ColumnWidth, FieldId, FieldKind, FieldOption, FieldValidation,
    FileHandle, HeadingLevel, ImageAlignment, ImagePosition, ImageSize,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Edit,
    #[default]
    Fill,
}

/// Live state of a fill session handed to the renderer
#[derive(Clone, Copy, Debug)]
pub struct FillState<'a> {
    pub answers: &'a AnswerMap,
    pub errors: &'a BTreeMap<FieldId, String>,
    pub submitting: bool,
}

// =============================================================================
// Presentation tree
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedForm {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mode: RenderMode,
    pub layout: RenderedLayout,
    pub submit: SubmitControl,
}

impl RenderedForm {
    /// Rendered fields in presentation order
    pub fn fields(&self) -> Vec<&RenderedField> {
        match &self.layout {
            RenderedLayout::Flow { items } => items.iter().map(|item| &item.field).collect(),
            RenderedLayout::Grid { rows, unplaced } => rows
                .iter()
                .flat_map(|row| row.cells.iter().filter_map(|cell| cell.field.as_ref()))
                .chain(unplaced.iter())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RenderedLayout {
    Flow { items: Vec<FlowItem> },
    Grid { rows: Vec<RenderedRow>, unplaced: Vec<RenderedField> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlowItem {
    pub width: ColumnWidth,
    pub fraction: f32,
    pub field: RenderedField,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedRow {
    pub template: String,
    pub cells: Vec<RenderedCell>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedCell {
    pub col: usize,
    pub fraction: f32,
    pub field: Option<RenderedField>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitControl {
    pub disabled: bool,
    pub submitting: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub field_id: FieldId,
    pub kind: FieldKind,
    /// `None` for image-only fields and static content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub required: bool,
    pub interactive: bool,
    pub widget: Widget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<RenderedImage>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceItem {
    pub label: String,
    pub value: String,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum Widget {
    Input {
        input_type: &'static str,
        placeholder: Option<String>,
        value: Option<String>,
        constraints: Option<FieldValidation>,
    },
    TextArea {
        placeholder: Option<String>,
        value: Option<String>,
        constraints: Option<FieldValidation>,
    },
    Select {
        placeholder: Option<String>,
        options: Vec<ChoiceItem>,
    },
    CheckboxGroup {
        options: Vec<ChoiceItem>,
    },
    RadioGroup {
        options: Vec<ChoiceItem>,
    },
    Slider {
        min: f64,
        max: f64,
        step: f64,
        value: Option<f64>,
    },
    FilePicker {
        file: Option<FileHandle>,
    },
    Heading {
        level: HeadingLevel,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Divider,
    Image,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub full_field: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<ImageAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<ImagePosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
}

// =============================================================================
// Renderer
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct Renderer {
    defaults: BuilderDefaults,
}

impl Renderer {
    pub fn new(defaults: BuilderDefaults) -> Self {
        Self { defaults }
    }

    /// Render `schema`. `fill` is ignored in edit mode; in fill mode a
    /// missing state renders a fresh session seeded from the field defaults.
    pub fn render(&self, schema: &FormSchema, mode: RenderMode, fill: Option<FillState<'_>>) -> RenderedForm {
        let initial_answers = match (mode, fill) {
            (RenderMode::Fill, None) => schema.initial_answers(),
            _ => AnswerMap::new(),
        };
        let empty_errors = BTreeMap::new();
        let state = match mode {
            RenderMode::Edit => None,
            RenderMode::Fill => Some(fill.unwrap_or(FillState {
                answers: &initial_answers,
                errors: &empty_errors,
                submitting: false,
            })),
        };

        let layout = match &schema.grid {
            None => RenderedLayout::Flow {
                items: schema
                    .fields
                    .iter()
                    .map(|field| FlowItem {
                        width: field.column_width(),
                        fraction: field.column_width().fraction(),
                        field: self.render_field(field, state),
                    })
                    .collect(),
            },
            Some(grid) => {
                let rows = grid
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(row, r)| RenderedRow {
                        template: r.template.name().to_string(),
                        cells: r
                            .template
                            .fractions()
                            .into_iter()
                            .enumerate()
                            .map(|(col, fraction)| RenderedCell {
                                col,
                                fraction,
                                field: schema
                                    .field_at(Cell::new(row, col))
                                    .map(|field| self.render_field(field, state)),
                            })
                            .collect(),
                    })
                    .collect();
                let unplaced = schema
                    .ordered_fields()
                    .into_iter()
                    .filter(|f| match f.cell() {
                        Some(cell) if grid.contains(cell) => {
                            schema.field_at(cell).map(|holder| holder.id != f.id).unwrap_or(true)
                        }
                        _ => true,
                    })
                    .map(|field| self.render_field(field, state))
                    .collect();
                RenderedLayout::Grid { rows, unplaced }
            }
        };

        let submit = match state {
            None => SubmitControl { disabled: true, submitting: false },
            Some(state) => SubmitControl {
                disabled: state.submitting || !missing_required(schema, state.answers).is_empty(),
                submitting: state.submitting,
            },
        };

        RenderedForm {
            title: schema.title.clone(),
            description: schema.description.clone(),
            mode,
            layout,
            submit,
        }
    }

    /// Type-picker preview of a fresh field of `kind`
    pub fn preview(&self, kind: FieldKind) -> RenderedField {
        self.render_field(&FieldSchema::with_defaults(kind, &self.defaults), None)
    }

    /// Render one field; `None` state means an inert edit-mode preview
    pub fn render_field(&self, field: &FieldSchema, state: Option<FillState<'_>>) -> RenderedField {
        let value = state.and_then(|s| s.answers.get(&field.id));
        let image = rendered_image(field);
        let image_only = field.is_image_only();

        let label = if field.kind.is_static() || image_only {
            None
        } else {
            Some(field.label.clone())
        };

        RenderedField {
            field_id: field.id.clone(),
            kind: field.kind,
            label,
            help_text: if field.accepts_input() { field.help_text.clone() } else { None },
            required: field.is_required(),
            interactive: state.is_some() && field.accepts_input(),
            widget: widget_for(field, value),
            error: state.and_then(|s| s.errors.get(&field.id).cloned()),
            image,
        }
    }
}

/// Required input fields whose current answer is blank
pub fn missing_required<'a>(schema: &'a FormSchema, answers: &AnswerMap) -> Vec<&'a FieldId> {
    schema
        .input_fields()
        .filter(|f| f.is_required() && answers.is_blank(&f.id))
        .map(|f| &f.id)
        .collect()
}

fn widget_for(field: &FieldSchema, value: Option<&AnswerValue>) -> Widget {
    let text = || value.and_then(|v| v.as_text()).map(|t| t.into_owned());
    let choices = |checked: &dyn Fn(&FieldOption) -> bool| {
        field
            .options
            .iter()
            .map(|o| ChoiceItem { label: o.label.clone(), value: o.value.clone(), checked: checked(o) })
            .collect::<Vec<_>>()
    };

    match field.kind {
        FieldKind::Text
        | FieldKind::Email
        | FieldKind::Phone
        | FieldKind::Url
        | FieldKind::Password
        | FieldKind::Number
        | FieldKind::Date
        | FieldKind::Time
        | FieldKind::Color => Widget::Input {
            input_type: field.kind.input_type(),
            placeholder: field.placeholder.clone(),
            value: text(),
            constraints: field.validation.clone(),
        },
        FieldKind::Textarea => Widget::TextArea {
            placeholder: field.placeholder.clone(),
            value: text(),
            constraints: field.validation.clone(),
        },
        FieldKind::Select => {
            let selected = text();
            Widget::Select {
                placeholder: field.placeholder.clone(),
                options: choices(&|o: &FieldOption| selected.as_deref() == Some(o.value.as_str())),
            }
        }
        FieldKind::Checkbox => {
            let picked: Vec<&str> = value.map(|v| v.as_list()).unwrap_or_default();
            Widget::CheckboxGroup { options: choices(&|o: &FieldOption| picked.contains(&o.value.as_str())) }
        }
        FieldKind::Radio => {
            let selected = text();
            Widget::RadioGroup { options: choices(&|o: &FieldOption| selected.as_deref() == Some(o.value.as_str())) }
        }
        FieldKind::Range => {
            let rules = field.validation();
            Widget::Slider {
                min: rules.and_then(|r| r.min).unwrap_or(0.0),
                max: rules.and_then(|r| r.max).unwrap_or(100.0),
                step: rules.and_then(|r| r.step).unwrap_or(1.0),
                value: value.and_then(|v| v.as_number()),
            }
        }
        FieldKind::File => Widget::FilePicker {
            file: match value {
                Some(AnswerValue::File(handle)) => Some(handle.clone()),
                _ => None,
            },
        },
        FieldKind::Heading => Widget::Heading {
            level: field.heading_level.unwrap_or_default(),
            text: field.label.clone(),
        },
        FieldKind::Paragraph => Widget::Paragraph {
            text: field.help_text.clone().unwrap_or_else(|| field.label.clone()),
        },
        FieldKind::Divider => Widget::Divider,
        FieldKind::Image if field.is_image_only() => Widget::Image,
        FieldKind::Image => Widget::Input {
            input_type: "text",
            placeholder: field.placeholder.clone(),
            value: text(),
            constraints: None,
        },
    }
}

fn rendered_image(field: &FieldSchema) -> Option<RenderedImage> {
    let settings = &field.image;
    let url = settings.url.clone().filter(|u| !u.is_empty())?;
    let full_field = field.is_image_only();

    // Geometry is dropped for image-only fields even when present
    let geometry = |v| if full_field { None } else { v };
    Some(RenderedImage {
        url,
        alt: settings.alt.clone(),
        caption: settings.caption.clone(),
        full_field,
        width: geometry(settings.width),
        height: geometry(settings.height),
        alignment: if full_field { None } else { settings.alignment },
        border: if full_field { None } else { settings.border },
        border_radius: geometry(settings.border_radius),
        position: if full_field { None } else { settings.position },
        size: settings.size,
    })
}
