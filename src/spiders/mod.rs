// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::workers::runtime::Spider;

pub mod fixture;

/// 爬虫工厂函数类型
pub type SpiderFactory = fn() -> Box<dyn Spider>;

/// 内置爬虫注册表
///
/// 真实站点的爬虫实现（如 indeed）属于外部协作方，
/// 不在本仓库内。这里注册的是合成工作负载爬虫，
/// 用于端到端演练分发与取消链路。
static SPIDERS: Lazy<HashMap<&'static str, SpiderFactory>> = Lazy::new(|| {
    let mut registry: HashMap<&'static str, SpiderFactory> = HashMap::new();
    registry.insert("testspider", fixture::FixtureSpider::boxed);
    registry.insert("testspider2", fixture::FixtureSpider::boxed);
    registry
});

/// 按名称创建爬虫实例
///
/// # 参数
///
/// * `name` - 爬虫名称
///
/// # 返回值
///
/// 返回爬虫实例；名称未注册时返回None
pub fn create(name: &str) -> Option<Box<dyn Spider>> {
    SPIDERS.get(name).map(|factory| factory())
}

/// 返回注册表中全部爬虫名称
pub fn registered_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = SPIDERS.keys().copied().collect();
    names.sort_unstable();
    names
}
