// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::snapshot::ParameterSnapshot;

/// 队列任务实体
///
/// 表示任务队列中一个待分发的工作单元。任务携带作业的
/// 参数快照，并通过锁令牌与锁过期时间实现可见性超时：
/// 一个被取走但未在超时前确认的任务会被重新投递，
/// 直到耗尽重投递次数为止。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 所属作业ID
    pub job_id: Uuid,
    /// 任务状态
    pub status: TaskStatus,
    /// 参数快照，入队后不再变化
    pub snapshot: ParameterSnapshot,
    /// 已尝试投递次数
    pub attempt_count: i32,
    /// 最大重投递次数
    pub max_retries: i32,
    /// 锁令牌，持有该任务的启动器ID
    pub lock_token: Option<Uuid>,
    /// 锁过期时间，超过后任务可被重新投递
    pub lock_expires_at: Option<DateTime<FixedOffset>>,
    /// 开始执行时间
    pub started_at: Option<DateTime<FixedOffset>>,
    /// 完成时间
    pub completed_at: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Queued → Active → Completed/Failed （锁过期时 Active → Queued）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 已入队，等待启动器取走
    #[default]
    Queued,
    /// 活跃中，已被某个启动器锁定
    Active,
    /// 已完成，作业达到终态并已确认
    Completed,
    /// 已失败，不再投递
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "queued"),
            TaskStatus::Active => write!(f, "active"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(TaskStatus::Queued),
            "active" => Ok(TaskStatus::Active),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(()),
        }
    }
}

impl Task {
    /// 创建一个新的队列任务
    ///
    /// 任务ID被写回快照，使工作进程能以 (spider_name, task_id)
    /// 组合键轮询取消信号存储。
    ///
    /// # 参数
    ///
    /// * `snapshot` - 作业参数快照
    /// * `max_retries` - 最大重投递次数
    ///
    /// # 返回值
    ///
    /// 返回新创建的任务实例
    pub fn new(snapshot: ParameterSnapshot, max_retries: i32) -> Self {
        let id = Uuid::new_v4();
        let job_id = snapshot.job_id;
        Self {
            id,
            job_id,
            status: TaskStatus::Queued,
            snapshot: snapshot.with_task_id(id),
            attempt_count: 0,
            max_retries,
            lock_token: None,
            lock_expires_at: None,
            started_at: None,
            completed_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// 判断任务是否还有重投递额度
    pub fn can_retry(&self) -> bool {
        self.attempt_count < self.max_retries
    }
}
