//! Infrastructure layer
//!
//! In-memory implementations of the outbound ports.

pub mod analytics;
pub mod persistence;

pub use analytics::{NoOpAnalytics, RecordingAnalytics, TracingAnalytics};
pub use persistence::{InMemoryFormRepository, InMemorySubmissionStore, StoredSubmission};
