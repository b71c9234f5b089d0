//! Domain module
//!
//! Form schema model and its interpreters: builder, layout resolver,
//! validation engine and renderer.

pub mod aggregates;
pub mod value_objects;
pub mod events;
pub mod services;

pub use aggregates::*;
pub use value_objects::*;
pub use events::*;
