//! Aggregates module

pub mod field;
pub mod form;
pub mod grid;

pub use field::{FieldPatch, FieldSchema, ImagePatch};
pub use form::{Form, FormSchema};
pub use grid::{GridLayout, Row};
