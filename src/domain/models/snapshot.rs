// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::job::ScrapeType;

/// 参数快照
///
/// 分发给单个工作进程的不可变配置包。快照在提交时构造，
/// 入队时补充任务ID，分发时由启动器补充产物文件路径，
/// 之后在任务的整个生命周期内不再变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterSnapshot {
    /// 爬虫名称
    pub spider_name: String,
    /// 抓取类型
    pub scrape_type: ScrapeType,
    /// 搜索关键字集合
    pub keywords: Vec<String>,
    /// 目标国家集合
    pub selected_countries: Vec<String>,
    /// 请求间延迟（秒）
    pub delay: u64,
    /// 下载超时（秒）
    pub timeout: u64,
    /// 重试预算
    pub retries: u32,
    /// 并发请求数
    pub concurrent_requests: u32,
    /// 是否使用代理
    pub use_proxies: bool,
    /// 是否保存到JSON输出文件
    pub save_to_feed: bool,
    /// 是否保存到数据库
    pub save_to_db: bool,
    /// 所属作业ID
    pub job_id: Uuid,
    /// 队列任务ID，入队时分配
    pub task_id: Option<Uuid>,
    /// 取消信号存储连接URL
    pub redis_url: String,
    /// 日志文件路径，分发时由启动器派生
    pub log_file: Option<String>,
    /// JSON输出文件路径，分发时由启动器派生
    pub feed_file: Option<String>,
}

impl ParameterSnapshot {
    /// 返回补充了任务ID的新快照
    pub fn with_task_id(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// 返回补充了产物文件路径的新快照
    ///
    /// # 参数
    ///
    /// * `log_file` - 日志文件路径
    /// * `feed_file` - JSON输出文件路径（未启用保存时为None）
    pub fn with_artifacts(mut self, log_file: String, feed_file: Option<String>) -> Self {
        self.log_file = Some(log_file);
        self.feed_file = feed_file;
        self
    }
}
