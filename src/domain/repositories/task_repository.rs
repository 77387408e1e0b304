// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::Task;
use async_trait::async_trait;
use uuid::Uuid;

pub use crate::domain::repositories::job_repository::RepositoryError;

/// 任务仓库特质
///
/// 定义任务队列的数据访问接口。队列是至少一次投递的：
/// 取走的任务持有带过期时间的锁，锁过期而未确认的任务
/// 会被重新入队，直到耗尽 `max_retries` 为止。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError>;
    /// 获取下一个待处理任务并锁定
    ///
    /// 按创建时间先进先出取走最早的Queued任务，设置锁令牌、
    /// 锁过期时间并递增尝试计数。
    ///
    /// # 参数
    ///
    /// * `launcher_id` - 取走任务的启动器ID
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Task))` - 成功锁定的任务
    /// * `Ok(None)` - 队列为空
    async fn acquire_next(&self, launcher_id: Uuid) -> Result<Option<Task>, RepositoryError>;
    /// 标记任务已完成（确认）
    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 标记任务已失败，不再投递
    async fn mark_failed(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 重新入队锁已过期且仍有重投递额度的任务
    ///
    /// # 返回值
    ///
    /// 返回重新入队的任务数
    async fn release_expired_locks(&self) -> Result<u64, RepositoryError>;
    /// 将锁已过期且耗尽重投递额度的任务标记为失败
    ///
    /// # 返回值
    ///
    /// 返回被标记失败的任务，供调用方将对应作业移入终态
    async fn fail_exhausted_tasks(&self) -> Result<Vec<Task>, RepositoryError>;
}
