// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::{job_handler, periodic_handler};
use axum::{
    routing::{delete, get, post},
    Router,
};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let job_routes = Router::new()
        .route("/v1/jobs", post(job_handler::submit_jobs))
        .route("/v1/jobs", get(job_handler::list_jobs))
        .route("/v1/jobs", delete(job_handler::delete_jobs))
        .route("/v1/jobs/{id}", get(job_handler::get_job_status))
        .route("/v1/jobs/{id}/stop", post(job_handler::stop_job))
        .route(
            "/v1/periodic-jobs",
            get(periodic_handler::list_periodic_jobs),
        )
        .route(
            "/v1/periodic-jobs/{id}/enable",
            post(periodic_handler::enable_periodic_job),
        )
        .route(
            "/v1/periodic-jobs/{id}/disable",
            post(periodic_handler::disable_periodic_job),
        );

    Router::new().merge(public_routes).merge(job_routes)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
