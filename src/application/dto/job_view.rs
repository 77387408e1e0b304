// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::job::{Job, JobStatus, ScrapeType};

/// 作业视图数据传输对象
///
/// 状态查询接口返回的持久化记录布局
#[derive(Debug, Deserialize, Serialize)]
pub struct JobViewDto {
    pub id: Uuid,
    pub spider_name: String,
    pub status: JobStatus,
    pub scrape_type: ScrapeType,
    pub use_proxies: bool,
    pub save_to_feed: bool,
    pub save_to_db: bool,
    pub items_scraped: i32,
    pub failure_reason: Option<String>,
    pub date_started: Option<DateTime<FixedOffset>>,
    pub date_finished: Option<DateTime<FixedOffset>>,
}

impl From<Job> for JobViewDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            spider_name: job.spider_name,
            status: job.status,
            scrape_type: job.scrape_type,
            use_proxies: job.use_proxies,
            save_to_feed: job.save_to_feed,
            save_to_db: job.save_to_db,
            items_scraped: job.items_scraped,
            failure_reason: job.failure_reason,
            date_started: job.date_started,
            date_finished: job.date_finished,
        }
    }
}
