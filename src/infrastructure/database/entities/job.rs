// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub spider_name: String,
    pub status: String,
    pub scrape_type: String,
    pub use_proxies: bool,
    pub save_to_feed: bool,
    pub save_to_db: bool,
    pub items_scraped: i32,
    pub task_handle: Option<Uuid>,
    pub failure_reason: Option<String>,
    pub periodic_job_id: Option<Uuid>,
    pub date_started: Option<ChronoDateTimeWithTimeZone>,
    pub date_finished: Option<ChronoDateTimeWithTimeZone>,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub updated_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
