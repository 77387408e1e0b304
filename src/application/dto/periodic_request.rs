// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::job::ScrapeType;
use crate::domain::models::periodic_job::PeriodicJobDefinition;

/// 周期作业启用请求数据传输对象
///
/// 启用在更新定义的保存设置之后注册触发器
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct EnablePeriodicRequestDto {
    /// 触发间隔（分钟）
    #[validate(range(min = 1, message = "Please choose repeat time"))]
    pub repeat_time: i32,
    /// 抓取类型
    #[serde(default)]
    pub scrape_type: ScrapeType,
    /// 搜索关键字集合
    #[validate(length(min = 1, message = "Please enter at least one keyword"))]
    pub keywords: Vec<String>,
    /// 目标国家集合
    #[validate(length(min = 1, message = "Please select at least one country"))]
    pub selected_countries: Vec<String>,
    /// 是否使用代理
    #[serde(default)]
    pub use_proxies: bool,
    /// 是否保存到JSON输出文件
    #[serde(default)]
    pub save_to_feed: bool,
    /// 是否保存到数据库
    #[serde(default)]
    pub save_to_db: bool,
}

/// 周期作业视图数据传输对象
#[derive(Debug, Deserialize, Serialize)]
pub struct PeriodicJobViewDto {
    pub id: Uuid,
    pub spider_name: String,
    pub scrape_type: ScrapeType,
    pub use_proxies: bool,
    pub save_to_feed: bool,
    pub save_to_db: bool,
    pub repeat_time: i32,
    pub enabled: bool,
    pub date_started: Option<DateTime<FixedOffset>>,
}

impl From<PeriodicJobDefinition> for PeriodicJobViewDto {
    fn from(definition: PeriodicJobDefinition) -> Self {
        Self {
            id: definition.id,
            spider_name: definition.spider_name,
            scrape_type: definition.scrape_type,
            use_proxies: definition.use_proxies,
            save_to_feed: definition.save_to_feed,
            save_to_db: definition.save_to_db,
            repeat_time: definition.repeat_time,
            enabled: definition.enabled,
            date_started: definition.date_started,
        }
    }
}
