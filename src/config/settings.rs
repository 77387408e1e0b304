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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 已知爬虫的默认清单，配置未提供 `spiders.known` 时使用
const DEFAULT_SPIDERS: &[&str] = &["indeed", "testspider", "testspider2"];

/// 应用程序配置设置
///
/// 包含数据库、Redis、服务器、爬虫默认参数、任务分发
/// 和产物目录等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// Redis配置
    pub redis: RedisSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 爬虫默认参数配置
    pub scraper: ScraperSettings,
    /// 任务分发配置
    pub dispatch: DispatchSettings,
    /// 产物目录配置
    pub artifacts: ArtifactSettings,
    /// 爬虫清单配置
    #[serde(default)]
    pub spiders: SpiderSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// Redis配置设置
#[derive(Debug, Deserialize)]
pub struct RedisSettings {
    /// Redis连接URL
    pub url: String,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 爬虫默认参数配置设置
///
/// 构造参数快照时使用的全局默认值
#[derive(Debug, Deserialize, Clone)]
pub struct ScraperSettings {
    /// 请求间延迟（秒）
    pub delay: u64,
    /// 下载超时（秒）
    pub timeout: u64,
    /// 重试预算
    pub retries: u32,
    /// 并发请求数
    pub concurrent_requests: u32,
}

/// 任务分发配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct DispatchSettings {
    /// 启动器循环数量
    pub launcher_count: usize,
    /// 工作进程可执行命令
    pub worker_command: String,
    /// 任务锁可见性超时（秒）
    pub visibility_timeout_secs: u64,
    /// 任务最大重投递次数
    pub max_retries: i32,
    /// 恢复工作器维护周期（秒）
    pub maintenance_interval_secs: u64,
    /// 孤儿Running作业回收前的宽限期（秒）
    pub orphan_grace_secs: u64,
}

/// 产物目录配置设置
#[derive(Debug, Deserialize, Clone)]
pub struct ArtifactSettings {
    /// 爬虫日志文件目录
    pub log_dir: String,
    /// JSON输出文件目录
    pub feeds_dir: String,
}

/// 爬虫清单配置设置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SpiderSettings {
    /// 已知爬虫名称清单，缺省时使用内置清单
    pub known: Option<Vec<String>>,
}

impl SpiderSettings {
    /// 返回已知爬虫名称清单
    pub fn known_spiders(&self) -> Vec<String> {
        match &self.known {
            Some(known) if !known.is_empty() => known.clone(),
            _ => DEFAULT_SPIDERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            // Default DB pool settings
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default scraper settings
            .set_default("scraper.delay", 3)?
            .set_default("scraper.timeout", 30)?
            .set_default("scraper.retries", 2)?
            .set_default("scraper.concurrent_requests", 1)?
            // Default dispatch settings
            .set_default("dispatch.launcher_count", 2)?
            .set_default("dispatch.worker_command", "scrapeops-worker")?
            .set_default("dispatch.visibility_timeout_secs", 300)?
            .set_default("dispatch.max_retries", 3)?
            .set_default("dispatch.maintenance_interval_secs", 60)?
            .set_default("dispatch.orphan_grace_secs", 120)?
            // Default artifact directories
            .set_default("artifacts.log_dir", "logs/spiders")?
            .set_default("artifacts.feeds_dir", "data/feeds")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SCRAPEOPS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
