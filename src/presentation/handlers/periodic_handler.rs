// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::{
    application::dto::periodic_request::EnablePeriodicRequestDto,
    presentation::AppPeriodicControl, utils::errors::AppError,
};

pub async fn list_periodic_jobs(
    Extension(control): Extension<Arc<AppPeriodicControl>>,
) -> impl IntoResponse {
    match control.list().await {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(e) => {
            error!("Failed listing periodic jobs: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

pub async fn enable_periodic_job(
    Extension(control): Extension<Arc<AppPeriodicControl>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EnablePeriodicRequestDto>,
) -> impl IntoResponse {
    match control.enable(id, payload).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(AppError::Configuration(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": msg,
            })),
        )
            .into_response(),
        Err(AppError::NotFound(msg)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "error": msg,
            })),
        )
            .into_response(),
        Err(AppError::ScheduleConflict(msg)) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "success": false,
                "error": msg,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed enabling periodic job {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Failed to process request due to internal error."
                })),
            )
                .into_response()
        }
    }
}

pub async fn disable_periodic_job(
    Extension(control): Extension<Arc<AppPeriodicControl>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match control.disable(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
            })),
        )
            .into_response(),
        Err(AppError::NotFound(msg)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "error": msg,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed disabling periodic job {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Failed to process request due to internal error."
                })),
            )
                .into_response()
        }
    }
}
