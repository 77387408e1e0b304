// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::application::dto::submit_request::DeleteJobsRequestDto;
use crate::config::settings::ArtifactSettings;
use crate::domain::repositories::job_repository::JobRepository;
use crate::infrastructure::artifacts;
use crate::utils::errors::AppError;

/// 作业删除用例
///
/// 删除作业记录并级联移除由 spider_name + date_started
/// 推导出的日志与JSON输出文件。删除不存在的作业ID是
/// 无操作，不是错误。
pub struct DeleteJobsUseCase<J>
where
    J: JobRepository,
{
    job_repository: Arc<J>,
    log_dir: PathBuf,
    feeds_dir: PathBuf,
}

impl<J> DeleteJobsUseCase<J>
where
    J: JobRepository,
{
    pub fn new(job_repository: Arc<J>, artifacts: &ArtifactSettings) -> Self {
        Self {
            job_repository,
            log_dir: PathBuf::from(&artifacts.log_dir),
            feeds_dir: PathBuf::from(&artifacts.feeds_dir),
        }
    }

    /// 执行删除，返回实际删除的作业数量
    pub async fn execute(&self, request: DeleteJobsRequestDto) -> Result<usize, AppError> {
        let deleted = if !request.selected_jobs.is_empty() {
            self.job_repository.delete(&request.selected_jobs).await?
        } else if request.all_jobs {
            self.job_repository.delete_all().await?
        } else {
            Vec::new()
        };

        for job in &deleted {
            artifacts::remove_job_artifacts(&self.log_dir, &self.feeds_dir, job);
        }

        info!("Deleted {} job(s)", deleted.len());
        Ok(deleted.len())
    }
}
