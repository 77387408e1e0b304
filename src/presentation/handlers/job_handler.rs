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
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::{
    application::dto::{
        job_view::JobViewDto,
        submit_request::{DeleteJobsRequestDto, SubmitJobsRequestDto, SubmitJobsResponseDto},
    },
    domain::models::job::JobStatus,
    domain::repositories::job_repository::JobRepository,
    infrastructure::repositories::job_repo_impl::JobRepositoryImpl,
    presentation::{AppCancelJob, AppDeleteJobs, AppSubmitJobs},
    utils::errors::AppError,
};

pub async fn submit_jobs(
    Extension(submit): Extension<Arc<AppSubmitJobs>>,
    Json(payload): Json<SubmitJobsRequestDto>,
) -> impl IntoResponse {
    match submit.execute(payload).await {
        Ok(job_ids) => {
            let response = SubmitJobsResponseDto {
                success: true,
                job_ids,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(AppError::Configuration(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": msg,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed submitting jobs: {}", e);
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

pub async fn get_job_status(
    Extension(job_repo): Extension<Arc<JobRepositoryImpl>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match job_repo.find_by_id(id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(JobViewDto::from(job))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "error": format!("Can't find the job id {id}"),
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed loading job {}: {}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<String>,
}

pub async fn list_jobs(
    Extension(job_repo): Extension<Arc<JobRepositoryImpl>>,
    Query(query): Query<ListJobsQuery>,
) -> impl IntoResponse {
    let result = match query.status.as_deref() {
        // "completed" covers both terminal states, mirroring the completed
        // jobs table in the operator UI
        Some("completed") => job_repo.list_terminal().await,
        Some(code) => match code.parse::<JobStatus>() {
            Ok(status) => job_repo.list_by_status(status).await,
            Err(()) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "success": false,
                        "error": format!("Unknown status '{code}'"),
                    })),
                )
                    .into_response();
            }
        },
        None => job_repo.list_by_status(JobStatus::Pending).await,
    };

    match result {
        Ok(jobs) => {
            let views: Vec<JobViewDto> = jobs.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(e) => {
            error!("Failed listing jobs: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

pub async fn stop_job(
    Extension(cancel): Extension<Arc<AppCancelJob>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match cancel.execute(id).await {
        Ok(canceled) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "canceled": canceled,
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
            error!("Failed stopping job {}: {}", id, e);
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

pub async fn delete_jobs(
    Extension(delete): Extension<Arc<AppDeleteJobs>>,
    Json(payload): Json<DeleteJobsRequestDto>,
) -> impl IntoResponse {
    match delete.execute(payload).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "deleted": deleted,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed deleting jobs: {}", e);
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
