//! Public submission endpoint

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use forms_core::{EmbedContext, FormId, SubmissionOutcome, SubmitResponseCommand};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::extract::{JsonBody, QueryParams};
use crate::models::{AnswersRequest, ApiResponse};
use crate::ApiState;

/// Submit answers. Identity fields of the embedding page arrive as query
/// parameters and are merged into the submission metadata.
pub async fn submit_response(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    QueryParams(embed): QueryParams<EmbedContext>,
    JsonBody(request): JsonBody<AnswersRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SubmissionOutcome>>)> {
    let mut command = SubmitResponseCommand::new(FormId::from_string(id), request.answers).with_embed(embed);
    command.metadata = request.metadata;

    let outcome = state.forms.submit_response(command).await?;
    let response = match outcome {
        SubmissionOutcome::Accepted { .. } => (StatusCode::CREATED, Json(ApiResponse::success(outcome))),
        SubmissionOutcome::Rejected { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::rejected(outcome, "validation_failed", "some answers are invalid")),
        ),
    };
    Ok(response)
}
