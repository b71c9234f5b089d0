//! Value Objects module
//!
//! Immutable domain primitives shared by the schema, layout and answer model.

pub mod field_kind;
pub mod option;
pub mod validation;
pub mod image;
pub mod layout;
pub mod answer;

pub use field_kind::FieldKind;
pub use option::FieldOption;
pub use validation::FieldValidation;
pub use image::{ImageAlignment, ImagePosition, ImageSettings, ImageSize};
pub use layout::{Cell, ColumnWidth, HeadingLevel, Placement, PlacementMode, RowTemplate};
pub use answer::{AnswerMap, AnswerValue, FileHandle};

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

entity_id!(
    /// Identifier of one field; join key into the answer map
    FieldId
);
entity_id!(
    /// Identifier of a persisted form
    FormId
);
entity_id!(
    /// Identifier of the actor owning a form
    OwnerId
);

/// Current actor as supplied by the identity collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: OwnerId,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Self { id: OwnerId::from_string(id), is_admin: false }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self { id: OwnerId::from_string(id), is_admin: true }
    }

    /// Owner scope applied to writes; admins are unscoped
    pub fn write_scope(&self) -> Option<&OwnerId> {
        if self.is_admin {
            None
        } else {
            Some(&self.id)
        }
    }
}
