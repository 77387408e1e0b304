// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use redis::AsyncCommands;

/// Redis客户端
///
/// 提供对Redis数据库的异步集合操作接口
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(anyhow::Error)` - 创建过程中出现的错误
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 向集合添加成员
    ///
    /// # 参数
    ///
    /// * `key` - 集合键
    /// * `member` - 成员
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 添加成功（成员已存在时同样成功）
    /// * `Err(anyhow::Error)` - 添加过程中出现的错误
    pub async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    /// 判断成员是否属于集合
    ///
    /// # 参数
    ///
    /// * `key` - 集合键
    /// * `member` - 成员
    ///
    /// # 返回值
    ///
    /// * `Ok(bool)` - 成员是否存在
    /// * `Err(anyhow::Error)` - 查询过程中出现的错误
    pub async fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let member_exists: bool = con.sismember(key, member).await?;
        Ok(member_exists)
    }

    /// 从集合移除成员
    ///
    /// # 参数
    ///
    /// * `key` - 集合键
    /// * `member` - 成员
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 移除成功（成员不存在时同样成功）
    /// * `Err(anyhow::Error)` - 移除过程中出现的错误
    pub async fn srem(&self, key: &str, member: &str) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }
}
