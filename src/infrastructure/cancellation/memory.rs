// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashSet;
use uuid::Uuid;

use super::{stop_key, CancellationError, CancellationStore};

/// 内存取消信号存储
///
/// 基于无锁并发集合的单节点实现，同时用于测试。
/// 成员形如 "<spider_name>:stop/<task_id>"，与Redis实现
/// 的键空间布局保持一致。
#[derive(Default)]
pub struct MemoryCancellationStore {
    entries: DashSet<String>,
}

impl MemoryCancellationStore {
    /// 创建新的内存取消信号存储实例
    pub fn new() -> Self {
        Self::default()
    }

    fn member(spider_name: &str, task_id: Uuid) -> String {
        format!("{}/{}", stop_key(spider_name), task_id)
    }
}

#[async_trait]
impl CancellationStore for MemoryCancellationStore {
    async fn request_stop(
        &self,
        spider_name: &str,
        task_id: Uuid,
    ) -> Result<(), CancellationError> {
        self.entries.insert(Self::member(spider_name, task_id));
        Ok(())
    }

    async fn is_stopped(
        &self,
        spider_name: &str,
        task_id: Uuid,
    ) -> Result<bool, CancellationError> {
        Ok(self.entries.contains(&Self::member(spider_name, task_id)))
    }

    async fn clear(&self, spider_name: &str, task_id: Uuid) -> Result<(), CancellationError> {
        self.entries.remove(&Self::member(spider_name, task_id));
        Ok(())
    }
}
