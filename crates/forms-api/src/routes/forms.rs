//! Form management endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use forms_core::{
    CreateFormCommand, Form, FormId, FormSchema, FormSummary, RenderedForm, UpdateFormCommand,
    ValidationReport,
};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::extract::{CurrentActor, JsonBody, QueryParams};
use crate::models::{AnswersRequest, ApiResponse, RenderQuery};
use crate::routes::submissions;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_forms).post(create_form))
        .route("/:id", get(get_form).put(update_form).delete(delete_form))
        .route("/:id/render", get(render_form))
        .route("/:id/validate", post(validate_answers))
        .route("/:id/submissions", post(submissions::submit_response))
}

/// Forms owned by the calling actor
pub async fn list_forms(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<ApiResponse<Vec<FormSummary>>>> {
    let forms = state.forms.list_forms(&actor.id).await?;
    Ok(Json(ApiResponse::success(forms)))
}

pub async fn create_form(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    JsonBody(schema): JsonBody<FormSchema>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Form>>)> {
    let form = state.forms.create_form(&actor, CreateFormCommand { schema }).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(form))))
}

pub async fn get_form(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let form = state.forms.get_form(&FormId::from_string(id)).await?;
    Ok(Json(ApiResponse::success(form)))
}

pub async fn update_form(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    JsonBody(schema): JsonBody<FormSchema>,
) -> ApiResult<Json<ApiResponse<Form>>> {
    let command = UpdateFormCommand { form_id: FormId::from_string(id), schema };
    let form = state.forms.update_form(&actor, command).await?;
    Ok(Json(ApiResponse::success(form)))
}

pub async fn delete_form(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.forms.delete_form(&actor, &FormId::from_string(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Presentation tree in `edit` or `fill` mode (default `fill`)
pub async fn render_form(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<RenderQuery>,
) -> ApiResult<Json<ApiResponse<RenderedForm>>> {
    let rendered = state.forms.render_form(&FormId::from_string(id), query.mode).await?;
    Ok(Json(ApiResponse::success(rendered)))
}

/// Dry-run validation; always 200, the report carries the verdict
pub async fn validate_answers(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<AnswersRequest>,
) -> ApiResult<Json<ApiResponse<ValidationReport>>> {
    let report = state.forms.validate_answers(&FormId::from_string(id), &request.answers).await?;
    Ok(Json(ApiResponse::success(report)))
}
