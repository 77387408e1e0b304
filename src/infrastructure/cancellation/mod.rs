// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryCancellationStore;
pub use self::redis::RedisCancellationStore;

/// 取消信号存储错误类型
#[derive(Error, Debug)]
pub enum CancellationError {
    /// 信号存储不可达
    #[error("Cancellation store unavailable: {0}")]
    Unavailable(String),
}

/// 取消信号键的线上格式："<spider_name>:stop" 集合，成员为任务ID字符串
pub fn stop_key(spider_name: &str) -> String {
    format!("{spider_name}:stop")
}

/// 取消信号存储特质
///
/// 纯信号面：按 (spider_name, task_id) 组合键记录未决的停止请求，
/// 与作业注册表没有任何事务关系。运维侧写入，工作进程在每个
/// 工作单元前读取，注册表侧在作业到达终态后清除。单节点部署
/// 用内存实现即可，多进程部署用Redis实现。
#[async_trait]
pub trait CancellationStore: Send + Sync {
    /// 请求停止指定任务（幂等）
    async fn request_stop(&self, spider_name: &str, task_id: Uuid)
        -> Result<(), CancellationError>;
    /// 查询指定任务是否被请求停止（幂等，可高频调用）
    async fn is_stopped(&self, spider_name: &str, task_id: Uuid)
        -> Result<bool, CancellationError>;
    /// 清除指定任务的停止标记（幂等）
    async fn clear(&self, spider_name: &str, task_id: Uuid) -> Result<(), CancellationError>;
}
