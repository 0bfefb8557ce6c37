//! services/api/src/web/execute.rs
//!
//! Code execution relay and the catalog of languages it accepts.

use crate::web::error::{HttpError, HttpResult};
use crate::web::params::{json_body, present};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use codelab_core::domain::ExecutionRequest;
use codelab_core::languages::{by_id, Language, LANGUAGES};
use codelab_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Submission payload. Field names follow the execution provider's own API.
#[derive(Deserialize, ToSchema)]
pub struct ExecuteRequest {
    pub source_code: Option<String>,
    pub language_id: Option<i64>,
    pub stdin: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResponse {
    pub id: i64,
    pub name: String,
    pub editor_id: String,
    pub extension: String,
}

impl From<&Language> for LanguageResponse {
    fn from(l: &Language) -> Self {
        Self {
            id: l.id,
            name: l.name.to_string(),
            editor_id: l.editor_id.to_string(),
            extension: l.extension.to_string(),
        }
    }
}

/// Run code on the execution provider and relay its result unchanged.
#[utoipa::path(
    post,
    path = "/api/judge0/execute",
    request_body = ExecuteRequest,
    responses(
        (status = 200, description = "Provider result, relayed verbatim"),
        (status = 400, description = "Missing source code or language id", body = crate::web::error::ErrorBody),
        (status = 500, description = "Provider unreachable", body = crate::web::error::ErrorBody)
    ),
    tag = "execution"
)]
pub async fn execute_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> HttpResult<impl IntoResponse> {
    let req = json_body(payload)?;

    let source_code = present(req.source_code)
        .ok_or_else(|| HttpError::bad_request("MISSING_SOURCE_CODE", "source_code is required"))?;
    let language_id = req
        .language_id
        .ok_or_else(|| HttpError::bad_request("MISSING_LANGUAGE_ID", "language_id is required"))?;

    match by_id(language_id) {
        Some(language) => debug!("Executing {} submission", language.name),
        None => debug!("Executing submission with unlisted language {}", language_id),
    }
    let request = ExecutionRequest {
        source_code,
        language_id,
        stdin: req.stdin,
    };

    match app_state.executor.execute(&request).await {
        Ok(result) => Ok((StatusCode::OK, Json(result))),
        Err(PortError::Upstream { status, message }) => {
            error!("Execution provider rejected submission ({}): {}", status, message);
            Err(HttpError::new(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                "EXECUTION_FAILED",
                "Failed to submit code to Judge0",
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// List the languages the execution provider supports.
#[utoipa::path(
    get,
    path = "/api/languages",
    responses(
        (status = 200, description = "Supported languages", body = [LanguageResponse])
    ),
    tag = "execution"
)]
pub async fn list_languages_handler() -> impl IntoResponse {
    let body: Vec<LanguageResponse> = LANGUAGES.iter().map(Into::into).collect();
    Json(body)
}
