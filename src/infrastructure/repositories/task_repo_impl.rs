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

use crate::domain::models::task::{Task, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::infrastructure::database::entities::task as task_entity;
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的任务队列数据访问层。任务抢占采用
/// 乐观比较并设置：先读出最早的Queued任务，再以状态为
/// 条件的UPDATE锁定，未命中说明已被其他启动器取走。
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
    /// 可见性超时：锁定后未确认的任务超过该时长即可重投递
    visibility_timeout: Duration,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    /// * `visibility_timeout` - 任务锁的可见性超时
    ///
    /// # 返回值
    ///
    /// 返回新的任务仓库实例
    pub fn new(db: Arc<DatabaseConnection>, visibility_timeout: Duration) -> Self {
        Self {
            db,
            visibility_timeout,
        }
    }
}

fn task_from_model(model: task_entity::Model) -> Result<Task, RepositoryError> {
    let snapshot = serde_json::from_value(model.snapshot)
        .map_err(|e| RepositoryError::Database(DbErr::Custom(format!("invalid snapshot: {e}"))))?;

    Ok(Task {
        id: model.id,
        job_id: model.job_id,
        status: model.status.parse().unwrap_or_default(),
        snapshot,
        attempt_count: model.attempt_count,
        max_retries: model.max_retries,
        lock_token: model.lock_token,
        lock_expires_at: model.lock_expires_at,
        started_at: model.started_at,
        completed_at: model.completed_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

impl From<&Task> for task_entity::ActiveModel {
    fn from(task: &Task) -> Self {
        Self {
            id: Set(task.id),
            job_id: Set(task.job_id),
            status: Set(task.status.to_string()),
            snapshot: Set(serde_json::to_value(&task.snapshot).unwrap_or_default()),
            attempt_count: Set(task.attempt_count),
            max_retries: Set(task.max_retries),
            lock_token: Set(task.lock_token),
            lock_expires_at: Set(task.lock_expires_at),
            started_at: Set(task.started_at),
            completed_at: Set(task.completed_at),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError> {
        let model: task_entity::ActiveModel = task.into();

        model.insert(self.db.as_ref()).await?;
        Ok(task.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        let model = task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(task_from_model).transpose()
    }

    async fn acquire_next(&self, launcher_id: Uuid) -> Result<Option<Task>, RepositoryError> {
        // 最多尝试几次，抢占冲突时换下一个候选
        for _ in 0..3 {
            let candidate = task_entity::Entity::find()
                .filter(task_entity::Column::Status.eq(TaskStatus::Queued.to_string()))
                .order_by_asc(task_entity::Column::CreatedAt)
                .one(self.db.as_ref())
                .await?;

            let Some(model) = candidate else {
                return Ok(None);
            };

            let now = Utc::now();
            let expires: DateTime<FixedOffset> = (now + self.visibility_timeout).into();

            let result = task_entity::Entity::update_many()
                .col_expr(
                    task_entity::Column::Status,
                    Expr::value(TaskStatus::Active.to_string()),
                )
                .col_expr(
                    task_entity::Column::LockToken,
                    Expr::value::<Option<Uuid>>(Some(launcher_id)),
                )
                .col_expr(
                    task_entity::Column::LockExpiresAt,
                    Expr::value::<Option<DateTime<FixedOffset>>>(Some(expires)),
                )
                .col_expr(
                    task_entity::Column::StartedAt,
                    Expr::value::<Option<DateTime<FixedOffset>>>(Some(now.into())),
                )
                .col_expr(
                    task_entity::Column::AttemptCount,
                    Expr::value(model.attempt_count + 1),
                )
                .col_expr(
                    task_entity::Column::UpdatedAt,
                    Expr::value::<DateTime<FixedOffset>>(now.into()),
                )
                .filter(task_entity::Column::Id.eq(model.id))
                .filter(task_entity::Column::Status.eq(TaskStatus::Queued.to_string()))
                .exec(self.db.as_ref())
                .await?;

            if result.rows_affected == 1 {
                return self.find_by_id(model.id).await;
            }
        }

        Ok(None)
    }

    async fn mark_completed(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = task_entity::Entity::update_many()
            .col_expr(
                task_entity::Column::Status,
                Expr::value(TaskStatus::Completed.to_string()),
            )
            .col_expr(
                task_entity::Column::CompletedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(Utc::now().into())),
            )
            .col_expr(
                task_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(task_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = task_entity::Entity::update_many()
            .col_expr(
                task_entity::Column::Status,
                Expr::value(TaskStatus::Failed.to_string()),
            )
            .col_expr(
                task_entity::Column::CompletedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(Utc::now().into())),
            )
            .col_expr(
                task_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(task_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn release_expired_locks(&self) -> Result<u64, RepositoryError> {
        let result = task_entity::Entity::update_many()
            .col_expr(
                task_entity::Column::Status,
                Expr::value(TaskStatus::Queued.to_string()),
            )
            .col_expr(
                task_entity::Column::LockToken,
                Expr::value(Option::<Uuid>::None),
            )
            .col_expr(
                task_entity::Column::LockExpiresAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .col_expr(
                task_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(task_entity::Column::Status.eq(TaskStatus::Active.to_string()))
            .filter(task_entity::Column::LockExpiresAt.lte(Utc::now()))
            .filter(
                Expr::col(task_entity::Column::AttemptCount)
                    .lt(Expr::col(task_entity::Column::MaxRetries)),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn fail_exhausted_tasks(&self) -> Result<Vec<Task>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(TaskStatus::Active.to_string()))
            .filter(task_entity::Column::LockExpiresAt.lte(Utc::now()))
            .filter(
                Expr::col(task_entity::Column::AttemptCount)
                    .gte(Expr::col(task_entity::Column::MaxRetries)),
            )
            .all(self.db.as_ref())
            .await?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        task_entity::Entity::update_many()
            .col_expr(
                task_entity::Column::Status,
                Expr::value(TaskStatus::Failed.to_string()),
            )
            .col_expr(
                task_entity::Column::CompletedAt,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(Utc::now().into())),
            )
            .col_expr(
                task_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(task_entity::Column::Id.is_in(ids))
            .filter(task_entity::Column::Status.eq(TaskStatus::Active.to_string()))
            .exec(self.db.as_ref())
            .await?;

        models.into_iter().map(task_from_model).collect()
    }
}
