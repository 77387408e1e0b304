// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 抓取作业实体
///
/// 表示一次具体的爬虫执行，可以是一次性提交的作业，
/// 也可以是周期作业定义的单次触发。作业拥有状态机、
/// 启动/结束时间戳和抓取计数等属性。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// 作业唯一标识符
    pub id: Uuid,
    /// 爬虫名称
    pub spider_name: String,
    /// 抓取类型，决定爬虫处理哪些目标
    pub scrape_type: ScrapeType,
    /// 作业状态，跟踪作业在其生命周期中的当前阶段
    pub status: JobStatus,
    /// 是否使用代理
    pub use_proxies: bool,
    /// 是否保存到JSON输出文件
    pub save_to_feed: bool,
    /// 是否保存到数据库
    pub save_to_db: bool,
    /// 已抓取条目数
    pub items_scraped: i32,
    /// 外部队列任务句柄，分发时设置一次
    pub task_handle: Option<Uuid>,
    /// 终止原因，区分运维取消与启动失败/重投递耗尽等失败类别
    pub failure_reason: Option<String>,
    /// 派生此作业的周期作业定义ID（一次性作业为空）
    pub periodic_job_id: Option<Uuid>,
    /// 开始执行时间
    pub date_started: Option<DateTime<FixedOffset>>,
    /// 结束时间
    pub date_finished: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 抓取类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeType {
    /// 抓取全部目标
    #[default]
    All,
    /// 仅抓取新目标
    New,
    /// 仅抓取未抓取过的目标
    Unscraped,
}

impl fmt::Display for ScrapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScrapeType::All => write!(f, "all"),
            ScrapeType::New => write!(f, "new"),
            ScrapeType::Unscraped => write!(f, "unscraped"),
        }
    }
}

impl FromStr for ScrapeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ScrapeType::All),
            "new" => Ok(ScrapeType::New),
            "unscraped" => Ok(ScrapeType::Unscraped),
            _ => Err(()),
        }
    }
}

/// 作业状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Running → Finished/Canceled
///
/// Canceled 为终态：取消请求之后迟到的完成报告不得覆盖它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 等待中，作业已创建但尚未分发
    #[default]
    Pending,
    /// 运行中，工作进程正在执行抓取
    Running,
    /// 已完成，爬虫正常耗尽全部工作单元
    Finished,
    /// 已取消，被外部停止请求或失败类别终止
    Canceled,
}

impl JobStatus {
    /// 判断状态是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Canceled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Canceled => write!(f, "canceled"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "finished" => Ok(JobStatus::Finished),
            "canceled" => Ok(JobStatus::Canceled),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当作业状态转换不符合状态机时发生
    #[error("Invalid state transition")]
    InvalidStateTransition,

    /// 验证错误，当输入数据不符合领域规则时发生
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl Job {
    /// 创建一个新的待处理作业
    ///
    /// # 参数
    ///
    /// * `spider_name` - 爬虫名称
    /// * `scrape_type` - 抓取类型
    /// * `use_proxies` - 是否使用代理
    /// * `save_to_feed` - 是否保存到输出文件
    /// * `save_to_db` - 是否保存到数据库
    ///
    /// # 返回值
    ///
    /// 返回新创建的作业实例
    pub fn new(
        spider_name: String,
        scrape_type: ScrapeType,
        use_proxies: bool,
        save_to_feed: bool,
        save_to_db: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            spider_name,
            scrape_type,
            status: JobStatus::Pending,
            use_proxies,
            save_to_feed,
            save_to_db,
            items_scraped: 0,
            task_handle: None,
            failure_reason: None,
            periodic_job_id: None,
            date_started: None,
            date_finished: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// 标记作业派生自某个周期作业定义
    pub fn descended_from(mut self, periodic_job_id: Uuid) -> Self {
        self.periodic_job_id = Some(periodic_job_id);
        self
    }

    /// 启动作业
    ///
    /// 将作业状态从Pending变更为Running，并记录任务句柄和开始时间
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 成功启动的作业
    /// * `Err(DomainError)` - 状态转换失败
    pub fn start(mut self, task_handle: Uuid) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Pending => {
                self.status = JobStatus::Running;
                self.task_handle = Some(task_handle);
                self.date_started = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 完成作业
    ///
    /// 将作业状态从Running变更为Finished
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 成功完成的作业
    /// * `Err(DomainError)` - 状态转换失败
    pub fn finish(mut self, items_scraped: i32) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running => {
                self.status = JobStatus::Finished;
                self.items_scraped = items_scraped;
                self.date_finished = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 取消作业
    ///
    /// 将作业状态变更为Canceled；已处于终态的作业不可再取消
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 已取消的作业
    /// * `Err(DomainError)` - 状态转换失败
    pub fn cancel(mut self, reason: Option<String>) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Pending | JobStatus::Running => {
                self.status = JobStatus::Canceled;
                self.failure_reason = reason;
                self.date_finished = Some(Utc::now().into());
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }
}

#[cfg(test)]
#[path = "job_test.rs"]
mod tests;
