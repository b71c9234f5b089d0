//! OpenSASE Forms core
//!
//! Form schema model with a dual-mode interpreter: builder-time preview and
//! submission-time rendering/validation.
//!
//! ## Architecture
//!
//! - **Domain Layer**: field and form schemas, grid layout, answer values
//! - **Domain Services**: schema builder, layout resolver, renderer,
//!   validation engine (all pure and synchronous)
//! - **Application Layer**: `FormService` persistence wrapper, `FillSession`
//! - **Ports Layer**: repository, submission and analytics interfaces
//! - **Infrastructure Layer**: in-memory implementations
//!
//! ## Example
//!
//! ```
//! use forms_core::{FieldKind, FormSchema, SchemaBuilder, ValidationEngine, AnswerMap};
//!
//! let builder = SchemaBuilder::default();
//! let schema = builder.append_field(&FormSchema::new("Contact"), FieldKind::Text, None).unwrap();
//!
//! let report = ValidationEngine::default().validate(&schema, &AnswerMap::new());
//! assert!(report.valid);
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::{
    CreateFormCommand, EmbedContext, FillSession, FormService, FormSummary, SubmissionOutcome,
    SubmissionState, SubmitResponseCommand, UpdateFormCommand,
};
pub use config::{BuilderDefaults, FormsConfig, ValidationOptions};
pub use domain::aggregates::{FieldPatch, FieldSchema, Form, FormSchema, GridLayout, ImagePatch, Row};
pub use domain::events::{DomainEvent, FormEvent, SubmissionEvent};
pub use domain::services::{
    OptionMove, RenderMode, RenderedForm, Renderer, SchemaBuilder, ValidationEngine,
    ValidationReport,
};
pub use domain::value_objects::{
    Actor, AnswerMap, AnswerValue, Cell, ColumnWidth, FieldId, FieldKind, FieldOption,
    FieldValidation, FormId, OwnerId, Placement, PlacementMode, RowTemplate,
};
pub use error::{FormsError, Result};
pub use ports::inbound::FormUseCases;
pub use ports::outbound::{AnalyticsSink, FormRepository, RepositoryError, SubmissionGateway};
