// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::snapshot::ParameterSnapshot;
use crate::domain::models::task::Task;
use crate::domain::repositories::task_repository::TaskRepository;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] crate::domain::repositories::job_repository::RepositoryError),
}

/// 任务队列特质
///
/// 提交/调度侧与工作分发侧之间的异步至少一次投递通道。
/// 入队为快照分配任务ID；跨作业之间不保证顺序，同一任务
/// 的重投递按先进先出顺序进行。
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// 入队参数快照，返回携带任务ID的任务
    async fn enqueue(&self, snapshot: ParameterSnapshot) -> Result<Task, QueueError>;

    /// 出队任务
    async fn dequeue(&self, launcher_id: Uuid) -> Result<Option<Task>, QueueError>;

    /// 确认任务（作业已达终态）
    async fn complete(&self, task_id: Uuid) -> Result<(), QueueError>;
    /// 永久失败任务（不再投递）
    async fn fail(&self, task_id: Uuid) -> Result<(), QueueError>;
}

/// PostgreSQL任务队列实现
pub struct PostgresTaskQueue<R: TaskRepository> {
    /// 任务仓库
    repository: Arc<R>,
    /// 新任务的最大重投递次数
    max_retries: i32,
}

impl<R: TaskRepository> PostgresTaskQueue<R> {
    /// 创建新的PostgreSQL任务队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 任务仓库
    /// * `max_retries` - 新任务的最大重投递次数
    ///
    /// # 返回值
    ///
    /// 返回新的PostgreSQL任务队列实例
    pub fn new(repository: Arc<R>, max_retries: i32) -> Self {
        Self {
            repository,
            max_retries,
        }
    }
}

#[async_trait]
impl<R: TaskRepository> TaskQueue for PostgresTaskQueue<R> {
    async fn enqueue(&self, snapshot: ParameterSnapshot) -> Result<Task, QueueError> {
        let task = Task::new(snapshot, self.max_retries);
        let created = self.repository.create(&task).await?;
        Ok(created)
    }

    async fn dequeue(&self, launcher_id: Uuid) -> Result<Option<Task>, QueueError> {
        let task = self.repository.acquire_next(launcher_id).await?;
        Ok(task)
    }

    async fn complete(&self, task_id: Uuid) -> Result<(), QueueError> {
        self.repository.mark_completed(task_id).await?;
        Ok(())
    }

    async fn fail(&self, task_id: Uuid) -> Result<(), QueueError> {
        self.repository.mark_failed(task_id).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: TaskQueue + ?Sized> TaskQueue for Arc<T> {
    async fn enqueue(&self, snapshot: ParameterSnapshot) -> Result<Task, QueueError> {
        (**self).enqueue(snapshot).await
    }

    async fn dequeue(&self, launcher_id: Uuid) -> Result<Option<Task>, QueueError> {
        (**self).dequeue(launcher_id).await
    }

    async fn complete(&self, task_id: Uuid) -> Result<(), QueueError> {
        (**self).complete(task_id).await
    }

    async fn fail(&self, task_id: Uuid) -> Result<(), QueueError> {
        (**self).fail(task_id).await
    }
}
