// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobStatus};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 作业仓库特质
///
/// 作业注册表：作业生命周期状态的唯一事实来源。
/// 同一作业行上的所有变更通过条件更新串行化，
/// 状态机约束由 `transition` 的原子比较并设置保证。
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新作业
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError>;
    /// 根据ID查找作业
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 按状态列出作业
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;
    /// 列出全部处于终态的作业
    async fn list_terminal(&self) -> Result<Vec<Job>, RepositoryError>;
    /// 原子状态转换（比较并设置）
    ///
    /// 仅当作业当前状态属于 `from` 集合时才写入 `to`，
    /// 否则不做任何修改并返回 `false`。终态作业因此不会被
    /// 迟到的完成报告覆盖。转换到终态时同时写入结束时间。
    ///
    /// # 参数
    ///
    /// * `id` - 作业ID
    /// * `from` - 允许的当前状态集合
    /// * `to` - 目标状态
    /// * `failure_reason` - 目标为取消时的终止原因（可选）
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 转换生效
    /// * `Ok(false)` - 当前状态不在允许集合内，未修改
    async fn transition(
        &self,
        id: Uuid,
        from: &[JobStatus],
        to: JobStatus,
        failure_reason: Option<&str>,
    ) -> Result<bool, RepositoryError>;
    /// 分发作业：Pending → Running，记录任务句柄与开始时间
    async fn mark_dispatched(
        &self,
        id: Uuid,
        task_handle: Uuid,
        date_started: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError>;
    /// 记录工作进程报告的抓取计数
    async fn record_result(&self, id: Uuid, items_scraped: i32) -> Result<(), RepositoryError>;
    /// 判断某周期作业定义是否有未到终态的派生作业（防重叠检查）
    async fn in_flight_exists_for_definition(
        &self,
        periodic_job_id: Uuid,
    ) -> Result<bool, RepositoryError>;
    /// 删除指定作业，返回实际删除的行供调用方级联清理产物文件
    ///
    /// 不存在的ID被跳过，不视为错误。
    async fn delete(&self, ids: &[Uuid]) -> Result<Vec<Job>, RepositoryError>;
    /// 删除全部作业，返回实际删除的行
    async fn delete_all(&self) -> Result<Vec<Job>, RepositoryError>;
}
