// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::models::job::JobStatus;
use crate::domain::repositories::job_repository::JobRepository;
use crate::infrastructure::cancellation::CancellationStore;
use crate::utils::errors::AppError;

/// 作业取消用例
///
/// 将作业解析为 (spider_name, task_id) 组合键并写入停止请求，
/// 随后把作业原子转换为Canceled。停止请求是发后即忘的：
/// 运行中的工作进程会在下一个轮询点观察到标记并停止。
/// 已处于终态的作业上的取消是无操作，不是错误。
pub struct CancelJobUseCase<J>
where
    J: JobRepository,
{
    job_repository: Arc<J>,
    cancellation: Arc<dyn CancellationStore>,
}

impl<J> CancelJobUseCase<J>
where
    J: JobRepository,
{
    pub fn new(job_repository: Arc<J>, cancellation: Arc<dyn CancellationStore>) -> Self {
        Self {
            job_repository,
            cancellation,
        }
    }

    /// 取消一个作业
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 作业被本次调用转换为Canceled
    /// * `Ok(false)` - 作业已处于终态，请求被吸收
    pub async fn execute(&self, job_id: Uuid) -> Result<bool, AppError> {
        let job = self
            .job_repository
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id}")))?;

        if job.status.is_terminal() {
            info!("Cancel request for job {} absorbed, already terminal", job_id);
            return Ok(false);
        }

        // 只有分发过的作业才有工作进程在轮询；Pending作业没有
        // 任务句柄，靠状态转换本身阻止后续分发。
        if let Some(task_handle) = job.task_handle {
            self.cancellation
                .request_stop(&job.spider_name, task_handle)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            info!(
                "Stop requested for spider {} task {}",
                job.spider_name, task_handle
            );
        }

        let transitioned = self
            .job_repository
            .transition(
                job_id,
                &[JobStatus::Pending, JobStatus::Running],
                JobStatus::Canceled,
                None,
            )
            .await?;

        Ok(transitioned)
    }
}
