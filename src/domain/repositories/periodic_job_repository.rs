// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::periodic_job::PeriodicJobDefinition;
use async_trait::async_trait;
use uuid::Uuid;

pub use crate::domain::repositories::job_repository::RepositoryError;

/// 周期作业定义仓库特质
#[async_trait]
pub trait PeriodicJobRepository: Send + Sync {
    /// 为每个尚无定义行的已知爬虫插入一行禁用定义
    ///
    /// # 参数
    ///
    /// * `spiders` - 已知爬虫名称集合
    ///
    /// # 返回值
    ///
    /// 返回新插入的行数
    async fn sync_known_spiders(&self, spiders: &[String]) -> Result<u64, RepositoryError>;
    /// 根据ID查找定义
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PeriodicJobDefinition>, RepositoryError>;
    /// 根据爬虫名称查找定义
    async fn find_by_spider_name(
        &self,
        spider_name: &str,
    ) -> Result<Option<PeriodicJobDefinition>, RepositoryError>;
    /// 列出全部定义
    async fn list_all(&self) -> Result<Vec<PeriodicJobDefinition>, RepositoryError>;
    /// 列出启用的定义
    async fn list_enabled(&self) -> Result<Vec<PeriodicJobDefinition>, RepositoryError>;
    /// 更新定义的调度设置
    async fn update(
        &self,
        definition: &PeriodicJobDefinition,
    ) -> Result<PeriodicJobDefinition, RepositoryError>;
    /// 启用或禁用定义
    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), RepositoryError>;
}
