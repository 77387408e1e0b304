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

use crate::domain::models::job::{Job, JobStatus};
use crate::domain::repositories::job_repository::{JobRepository, RepositoryError};
use crate::infrastructure::database::entities::job as job_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 作业仓库实现
///
/// 基于SeaORM实现的作业数据访问层。状态转换通过带状态
/// 过滤条件的单条UPDATE实现，同一行上的并发转换由数据库
/// 行级原子性串行化。
#[derive(Clone)]
pub struct JobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl JobRepositoryImpl {
    /// 创建新的作业仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的作业仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<job_entity::Model> for Job {
    fn from(model: job_entity::Model) -> Self {
        Self {
            id: model.id,
            spider_name: model.spider_name,
            scrape_type: model.scrape_type.parse().unwrap_or_default(),
            status: model.status.parse().unwrap_or_default(),
            use_proxies: model.use_proxies,
            save_to_feed: model.save_to_feed,
            save_to_db: model.save_to_db,
            items_scraped: model.items_scraped,
            task_handle: model.task_handle,
            failure_reason: model.failure_reason,
            periodic_job_id: model.periodic_job_id,
            date_started: model.date_started,
            date_finished: model.date_finished,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Job> for job_entity::ActiveModel {
    fn from(job: Job) -> Self {
        Self {
            id: Set(job.id),
            spider_name: Set(job.spider_name.clone()),
            status: Set(job.status.to_string()),
            scrape_type: Set(job.scrape_type.to_string()),
            use_proxies: Set(job.use_proxies),
            save_to_feed: Set(job.save_to_feed),
            save_to_db: Set(job.save_to_db),
            items_scraped: Set(job.items_scraped),
            task_handle: Set(job.task_handle),
            failure_reason: Set(job.failure_reason.clone()),
            periodic_job_id: Set(job.periodic_job_id),
            date_started: Set(job.date_started),
            date_finished: Set(job.date_finished),
            created_at: Set(job.created_at),
            updated_at: Set(job.updated_at),
        }
    }
}

#[async_trait]
impl JobRepository for JobRepositoryImpl {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let model: job_entity::ActiveModel = job.clone().into();

        model.insert(self.db.as_ref()).await?;
        Ok(job.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let model = job_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let models = job_entity::Entity::find()
            .filter(job_entity::Column::Status.eq(status.to_string()))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Job::from).collect())
    }

    async fn list_terminal(&self) -> Result<Vec<Job>, RepositoryError> {
        let models = job_entity::Entity::find()
            .filter(job_entity::Column::Status.is_in(vec![
                JobStatus::Finished.to_string(),
                JobStatus::Canceled.to_string(),
            ]))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Job::from).collect())
    }

    async fn transition(
        &self,
        id: Uuid,
        from: &[JobStatus],
        to: JobStatus,
        failure_reason: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let from_codes: Vec<String> = from.iter().map(|s| s.to_string()).collect();

        let mut update = job_entity::Entity::update_many()
            .col_expr(job_entity::Column::Status, Expr::value(to.to_string()))
            .col_expr(
                job_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            );

        if to.is_terminal() {
            update = update.col_expr(
                job_entity::Column::DateFinished,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(Utc::now().into())),
            );
        }

        if let Some(reason) = failure_reason {
            update = update.col_expr(
                job_entity::Column::FailureReason,
                Expr::value::<Option<String>>(Some(reason.to_string())),
            );
        }

        let result = update
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.is_in(from_codes))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_dispatched(
        &self,
        id: Uuid,
        task_handle: Uuid,
        date_started: DateTime<FixedOffset>,
    ) -> Result<bool, RepositoryError> {
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::Status,
                Expr::value(JobStatus::Running.to_string()),
            )
            .col_expr(
                job_entity::Column::TaskHandle,
                Expr::value::<Option<Uuid>>(Some(task_handle)),
            )
            .col_expr(
                job_entity::Column::DateStarted,
                Expr::value::<Option<DateTime<FixedOffset>>>(Some(date_started)),
            )
            .col_expr(
                job_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(job_entity::Column::Id.eq(id))
            .filter(job_entity::Column::Status.eq(JobStatus::Pending.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn record_result(&self, id: Uuid, items_scraped: i32) -> Result<(), RepositoryError> {
        let result = job_entity::Entity::update_many()
            .col_expr(
                job_entity::Column::ItemsScraped,
                Expr::value(items_scraped),
            )
            .col_expr(
                job_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(job_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn in_flight_exists_for_definition(
        &self,
        periodic_job_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        use sea_orm::PaginatorTrait;

        let count = job_entity::Entity::find()
            .filter(job_entity::Column::PeriodicJobId.eq(periodic_job_id))
            .filter(job_entity::Column::Status.is_in(vec![
                JobStatus::Pending.to_string(),
                JobStatus::Running.to_string(),
            ]))
            .count(self.db.as_ref())
            .await?;

        Ok(count > 0)
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<Vec<Job>, RepositoryError> {
        let models = job_entity::Entity::find()
            .filter(job_entity::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        job_entity::Entity::delete_many()
            .filter(job_entity::Column::Id.is_in(ids.to_vec()))
            .exec(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Job::from).collect())
    }

    async fn delete_all(&self) -> Result<Vec<Job>, RepositoryError> {
        let models = job_entity::Entity::find().all(self.db.as_ref()).await?;

        job_entity::Entity::delete_many()
            .exec(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Job::from).collect())
    }
}
