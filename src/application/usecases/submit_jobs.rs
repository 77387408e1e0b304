// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::submit_request::SubmitJobsRequestDto;
use crate::config::settings::ScraperSettings;
use crate::domain::models::job::Job;
use crate::domain::models::snapshot::ParameterSnapshot;
use crate::domain::repositories::job_repository::JobRepository;
use crate::queue::task_queue::TaskQueue;
use crate::utils::errors::AppError;

// === Section: Use Case Definition ===

/// 作业提交用例
///
/// 校验提交请求，为每个选中的爬虫创建一个Pending作业，
/// 并将其参数快照入队。配置错误在创建任何作业行之前拒绝。
pub struct SubmitJobsUseCase<J, Q>
where
    J: JobRepository,
    Q: TaskQueue,
{
    job_repository: Arc<J>,
    queue: Arc<Q>,
    scraper: ScraperSettings,
    redis_url: String,
    known_spiders: Vec<String>,
}

// === Section: Implementation ===

impl<J, Q> SubmitJobsUseCase<J, Q>
where
    J: JobRepository,
    Q: TaskQueue,
{
    pub fn new(
        job_repository: Arc<J>,
        queue: Arc<Q>,
        scraper: ScraperSettings,
        redis_url: String,
        known_spiders: Vec<String>,
    ) -> Self {
        Self {
            job_repository,
            queue,
            scraper,
            redis_url,
            known_spiders,
        }
    }

    pub async fn execute(&self, request: SubmitJobsRequestDto) -> Result<Vec<Uuid>, AppError> {
        request
            .validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        for spider_name in &request.spider_names {
            if !self.known_spiders.contains(spider_name) {
                return Err(AppError::Configuration(format!(
                    "Unknown spider '{spider_name}'"
                )));
            }
        }

        let mut job_ids = Vec::with_capacity(request.spider_names.len());

        for spider_name in &request.spider_names {
            let job = Job::new(
                spider_name.clone(),
                request.scrape_type,
                request.use_proxies,
                request.save_to_feed,
                request.save_to_db,
            );
            let job = self.job_repository.create(&job).await?;

            let snapshot = ParameterSnapshot {
                spider_name: spider_name.clone(),
                scrape_type: request.scrape_type,
                keywords: request.keywords.clone(),
                selected_countries: request.selected_countries.clone(),
                delay: self.scraper.delay,
                timeout: self.scraper.timeout,
                retries: self.scraper.retries,
                concurrent_requests: self.scraper.concurrent_requests,
                use_proxies: request.use_proxies,
                save_to_feed: request.save_to_feed,
                save_to_db: request.save_to_db,
                job_id: job.id,
                task_id: None,
                redis_url: self.redis_url.clone(),
                log_file: None,
                feed_file: None,
            };

            let task = self
                .queue
                .enqueue(snapshot)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

            info!(
                "Submitted job {} (task {}) for spider {}",
                job.id, task.id, spider_name
            );
            job_ids.push(job.id);
        }

        Ok(job_ids)
    }
}
