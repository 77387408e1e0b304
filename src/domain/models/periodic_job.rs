// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::job::ScrapeType;

/// 周期作业定义
///
/// 与一个爬虫名称一对一绑定的循环调度配置。
/// 定义在系统启动时为每个已知爬虫建立一行，
/// 由运维操作启用/禁用，从不删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicJobDefinition {
    /// 定义唯一标识符
    pub id: Uuid,
    /// 爬虫名称（唯一）
    pub spider_name: String,
    /// 抓取类型
    pub scrape_type: ScrapeType,
    /// 是否使用代理
    pub use_proxies: bool,
    /// 是否保存到JSON输出文件
    pub save_to_feed: bool,
    /// 是否保存到数据库
    pub save_to_db: bool,
    /// 搜索关键字集合，启用时随调度设置一并保存
    pub keywords: Vec<String>,
    /// 目标国家集合，启用时随调度设置一并保存
    pub selected_countries: Vec<String>,
    /// 触发间隔（分钟），启用时必须大于0
    pub repeat_time: i32,
    /// 是否启用
    pub enabled: bool,
    /// 最近一次启用时间
    pub date_started: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 更新时间
    pub updated_at: DateTime<FixedOffset>,
}

impl PeriodicJobDefinition {
    /// 为一个已知爬虫创建默认（禁用）定义
    ///
    /// # 参数
    ///
    /// * `spider_name` - 爬虫名称
    ///
    /// # 返回值
    ///
    /// 返回新的禁用状态定义
    pub fn new(spider_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            spider_name,
            scrape_type: ScrapeType::All,
            use_proxies: false,
            save_to_feed: false,
            save_to_db: false,
            keywords: Vec::new(),
            selected_countries: Vec::new(),
            repeat_time: 0,
            enabled: false,
            date_started: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }
}
