// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 应用层错误类型
///
/// 边界错误分类：配置错误与调度冲突在边界处恢复（拒绝/记录），
/// 不会破坏注册表状态；启动与分发失败总是被解析为作业终态。
#[derive(Error, Debug)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("调度冲突: {0}")]
    ScheduleConflict(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl From<crate::domain::repositories::job_repository::RepositoryError> for AppError {
    fn from(e: crate::domain::repositories::job_repository::RepositoryError) -> Self {
        AppError::Internal(e.to_string())
    }
}
