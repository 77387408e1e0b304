// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::periodic_job::PeriodicJobDefinition;
use crate::domain::repositories::periodic_job_repository::{
    PeriodicJobRepository, RepositoryError,
};
use crate::infrastructure::database::entities::periodic_job as periodic_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// 周期作业定义仓库实现
#[derive(Clone)]
pub struct PeriodicJobRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl PeriodicJobRepositoryImpl {
    /// 创建新的周期作业定义仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    ///
    /// # 返回值
    ///
    /// 返回新的周期作业定义仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<periodic_entity::Model> for PeriodicJobDefinition {
    fn from(model: periodic_entity::Model) -> Self {
        Self {
            id: model.id,
            spider_name: model.spider_name,
            scrape_type: model.scrape_type.parse().unwrap_or_default(),
            use_proxies: model.use_proxies,
            save_to_feed: model.save_to_feed,
            save_to_db: model.save_to_db,
            keywords: serde_json::from_value(model.keywords).unwrap_or_default(),
            selected_countries: serde_json::from_value(model.selected_countries)
                .unwrap_or_default(),
            repeat_time: model.repeat_time,
            enabled: model.enabled,
            date_started: model.date_started,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&PeriodicJobDefinition> for periodic_entity::ActiveModel {
    fn from(definition: &PeriodicJobDefinition) -> Self {
        Self {
            id: Set(definition.id),
            spider_name: Set(definition.spider_name.clone()),
            scrape_type: Set(definition.scrape_type.to_string()),
            use_proxies: Set(definition.use_proxies),
            save_to_feed: Set(definition.save_to_feed),
            save_to_db: Set(definition.save_to_db),
            keywords: Set(serde_json::to_value(&definition.keywords).unwrap_or_default()),
            selected_countries: Set(
                serde_json::to_value(&definition.selected_countries).unwrap_or_default()
            ),
            repeat_time: Set(definition.repeat_time),
            enabled: Set(definition.enabled),
            date_started: Set(definition.date_started),
            created_at: Set(definition.created_at),
            updated_at: Set(definition.updated_at),
        }
    }
}

#[async_trait]
impl PeriodicJobRepository for PeriodicJobRepositoryImpl {
    async fn sync_known_spiders(&self, spiders: &[String]) -> Result<u64, RepositoryError> {
        let existing: HashSet<String> = periodic_entity::Entity::find()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|m| m.spider_name)
            .collect();

        let mut inserted = 0;
        for spider_name in spiders {
            if existing.contains(spider_name) {
                continue;
            }
            let definition = PeriodicJobDefinition::new(spider_name.clone());
            let model: periodic_entity::ActiveModel = (&definition).into();
            model.insert(self.db.as_ref()).await?;
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<PeriodicJobDefinition>, RepositoryError> {
        let model = periodic_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_spider_name(
        &self,
        spider_name: &str,
    ) -> Result<Option<PeriodicJobDefinition>, RepositoryError> {
        let model = periodic_entity::Entity::find()
            .filter(periodic_entity::Column::SpiderName.eq(spider_name))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<PeriodicJobDefinition>, RepositoryError> {
        let models = periodic_entity::Entity::find().all(self.db.as_ref()).await?;

        Ok(models.into_iter().map(PeriodicJobDefinition::from).collect())
    }

    async fn list_enabled(&self) -> Result<Vec<PeriodicJobDefinition>, RepositoryError> {
        let models = periodic_entity::Entity::find()
            .filter(periodic_entity::Column::Enabled.eq(true))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(PeriodicJobDefinition::from).collect())
    }

    async fn update(
        &self,
        definition: &PeriodicJobDefinition,
    ) -> Result<PeriodicJobDefinition, RepositoryError> {
        let mut model: periodic_entity::ActiveModel = definition.into();
        model.updated_at = Set(Utc::now().into());

        let updated = model.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), RepositoryError> {
        let result = periodic_entity::Entity::update_many()
            .col_expr(periodic_entity::Column::Enabled, Expr::value(enabled))
            .col_expr(
                periodic_entity::Column::UpdatedAt,
                Expr::value::<DateTime<FixedOffset>>(Utc::now().into()),
            )
            .filter(periodic_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
