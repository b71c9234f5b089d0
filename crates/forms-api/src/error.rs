//! HTTP error mapping

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forms_core::FormsError;
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Forms(#[from] FormsError),

    #[error("missing actor identity")]
    MissingActor,

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Forms(e) => match e {
                FormsError::FormNotFound(_)
                | FormsError::FieldNotFound(_)
                | FormsError::RowNotFound(_)
                | FormsError::CellNotFound { .. } => StatusCode::NOT_FOUND,
                FormsError::PersistenceConflict(_)
                | FormsError::SubmissionInProgress
                | FormsError::AlreadySubmitted
                | FormsError::CellOccupied { .. } => StatusCode::CONFLICT,
                FormsError::InvalidSchema(_) | FormsError::IndexOutOfRange { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                FormsError::Unauthorized => StatusCode::FORBIDDEN,
                FormsError::SubmissionFailed(_)
                | FormsError::Storage(_)
                | FormsError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::MissingActor => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Forms(e) => match e {
                FormsError::FormNotFound(_) => "form_not_found",
                FormsError::FieldNotFound(_) => "field_not_found",
                FormsError::RowNotFound(_) | FormsError::CellNotFound { .. } => "cell_not_found",
                FormsError::PersistenceConflict(_) => "duplicate_title",
                FormsError::SubmissionInProgress => "submission_in_progress",
                FormsError::AlreadySubmitted => "already_submitted",
                FormsError::CellOccupied { .. } => "cell_occupied",
                FormsError::InvalidSchema(_) | FormsError::IndexOutOfRange { .. } => "invalid_schema",
                FormsError::Unauthorized => "forbidden",
                FormsError::SubmissionFailed(_) => "submission_failed",
                FormsError::Storage(_) | FormsError::Config(_) => "internal",
            },
            Self::MissingActor => "unauthenticated",
            Self::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        // Internal details stay in the log
        let message = match &self {
            Self::Forms(FormsError::Storage(_) | FormsError::Config(_)) => "internal error".to_string(),
            Self::Forms(FormsError::SubmissionFailed(_)) => {
                "submission failed, please try again".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(self.code(), &message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
