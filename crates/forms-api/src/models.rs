//! API Models

use forms_core::{AnswerMap, RenderMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse { code: code.to_string(), message: message.to_string() }),
        }
    }

    /// Failure that still carries a payload (e.g. a validation report)
    pub fn rejected(data: T, code: &str, message: &str) -> Self {
        Self { data: Some(data), ..Self::error(code, message) }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub mode: RenderMode,
}

#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    #[serde(default)]
    pub answers: AnswerMap,
    /// Client metadata passed through to the submission store
    #[serde(default)]
    pub metadata: Map<String, Value>,
}
