// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::job::ScrapeType;

/// 作业提交请求数据传输对象
///
/// 一次提交可以为多个选中的爬虫各创建一个作业
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SubmitJobsRequestDto {
    /// 选中的爬虫名称列表
    #[validate(length(min = 1, message = "Please select at least one spider"))]
    pub spider_names: Vec<String>,
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

/// 作业提交响应数据传输对象
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitJobsResponseDto {
    pub success: bool,
    /// 新创建的作业ID列表
    pub job_ids: Vec<Uuid>,
}

/// 作业删除请求数据传输对象
///
/// 选中若干作业ID，或一次删除全部已结束作业的记录
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct DeleteJobsRequestDto {
    /// 是否删除全部作业
    #[serde(default)]
    pub all_jobs: bool,
    /// 选中的作业ID列表
    #[serde(default)]
    pub selected_jobs: Vec<Uuid>,
}
