//! Application layer
//!
//! Orchestrates the domain services around the outbound ports.

pub mod commands;
pub mod dto;
pub mod fill_session;

pub use commands::FormService;
pub use dto::*;
pub use fill_session::{FillSession, SubmissionState};
