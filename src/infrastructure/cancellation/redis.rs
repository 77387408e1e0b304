// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use uuid::Uuid;

use super::{stop_key, CancellationError, CancellationStore};
use crate::infrastructure::cache::redis_client::RedisClient;

/// Redis取消信号存储
///
/// 多进程部署的实现：控制面与各工作进程共享同一个
/// Redis实例，键 "<spider_name>:stop" 下的集合成员为
/// 被请求停止的任务ID。
#[derive(Clone)]
pub struct RedisCancellationStore {
    redis: RedisClient,
}

impl RedisCancellationStore {
    /// 创建新的Redis取消信号存储实例
    ///
    /// # 参数
    ///
    /// * `redis` - Redis客户端
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl CancellationStore for RedisCancellationStore {
    async fn request_stop(
        &self,
        spider_name: &str,
        task_id: Uuid,
    ) -> Result<(), CancellationError> {
        self.redis
            .sadd(&stop_key(spider_name), &task_id.to_string())
            .await
            .map_err(|e| CancellationError::Unavailable(e.to_string()))
    }

    async fn is_stopped(
        &self,
        spider_name: &str,
        task_id: Uuid,
    ) -> Result<bool, CancellationError> {
        self.redis
            .sismember(&stop_key(spider_name), &task_id.to_string())
            .await
            .map_err(|e| CancellationError::Unavailable(e.to_string()))
    }

    async fn clear(&self, spider_name: &str, task_id: Uuid) -> Result<(), CancellationError> {
        self.redis
            .srem(&stop_key(spider_name), &task_id.to_string())
            .await
            .map_err(|e| CancellationError::Unavailable(e.to_string()))
    }
}
