//! Domain Services
//!
//! Pure operations over form schemas: mutation, grid layout, rendering and
//! answer validation.

pub mod builder;
pub mod layout;
pub mod renderer;
pub mod validation;

pub use builder::{OptionMove, SchemaBuilder};
pub use layout::{DropOutcome, Reassignment, RowDeletion};
pub use renderer::{
    missing_required, FillState, RenderMode, RenderedField, RenderedForm, RenderedLayout, Renderer,
    Widget,
};
pub use validation::{ValidationEngine, ValidationReport};
