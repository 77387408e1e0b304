// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::periodic_request::{EnablePeriodicRequestDto, PeriodicJobViewDto};
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::periodic_job_repository::PeriodicJobRepository;
use crate::queue::periodic_scheduler::{PeriodicScheduler, SchedulerError};
use crate::queue::task_queue::TaskQueue;
use crate::utils::errors::AppError;

/// 周期作业控制用例
///
/// 启用：把请求中的调度设置写入定义行，然后以替换语义注册
/// 触发器。禁用：取消触发器并在定义行上落盘，即使触发器
/// 查找失败也要完成落盘。
pub struct PeriodicControlUseCase<J, P, Q>
where
    J: JobRepository + 'static,
    P: PeriodicJobRepository + 'static,
    Q: TaskQueue + 'static,
{
    periodic_repository: Arc<P>,
    scheduler: Arc<PeriodicScheduler<J, P, Q>>,
}

impl<J, P, Q> PeriodicControlUseCase<J, P, Q>
where
    J: JobRepository,
    P: PeriodicJobRepository,
    Q: TaskQueue,
{
    pub fn new(periodic_repository: Arc<P>, scheduler: Arc<PeriodicScheduler<J, P, Q>>) -> Self {
        Self {
            periodic_repository,
            scheduler,
        }
    }

    /// 启用一个周期作业定义
    pub async fn enable(
        &self,
        definition_id: Uuid,
        request: EnablePeriodicRequestDto,
    ) -> Result<PeriodicJobViewDto, AppError> {
        request
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        let mut definition = self
            .periodic_repository
            .find_by_id(definition_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Periodic job {definition_id}")))?;

        definition.scrape_type = request.scrape_type;
        definition.use_proxies = request.use_proxies;
        definition.save_to_feed = request.save_to_feed;
        definition.save_to_db = request.save_to_db;
        definition.keywords = request.keywords;
        definition.selected_countries = request.selected_countries;
        definition.repeat_time = request.repeat_time;
        definition.enabled = true;
        definition.date_started = Some(Utc::now().into());

        let definition = self.periodic_repository.update(&definition).await?;

        match self.scheduler.replace(&definition).await {
            Ok(()) => Ok(definition.into()),
            Err(SchedulerError::Conflict(id)) => {
                // 替换语义下不应出现；出现则保留既有调度并上报软失败
                warn!("Schedule conflict for definition {}, keeping existing", id);
                Err(AppError::ScheduleConflict(format!("Periodic job {id}")))
            }
            Err(e) => {
                error!("Failed arming periodic job {}: {}", definition_id, e);
                self.periodic_repository
                    .set_enabled(definition_id, false)
                    .await?;
                Err(AppError::Internal(e.to_string()))
            }
        }
    }

    /// 禁用一个周期作业定义
    pub async fn disable(&self, definition_id: Uuid) -> Result<(), AppError> {
        let definition = self.periodic_repository.find_by_id(definition_id).await?;

        // 无论定义行是否存在，先撤掉可能还在跑的触发器
        self.scheduler.disarm(definition_id).await;

        if definition.is_none() {
            return Err(AppError::NotFound(format!("Periodic job {definition_id}")));
        }

        self.periodic_repository
            .set_enabled(definition_id, false)
            .await?;
        Ok(())
    }

    /// 列出全部周期作业定义
    pub async fn list(&self) -> Result<Vec<PeriodicJobViewDto>, AppError> {
        let definitions = self.periodic_repository.list_all().await?;
        Ok(definitions.into_iter().map(Into::into).collect())
    }
}
