// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::models::snapshot::ParameterSnapshot;
use crate::workers::runtime::{Item, Spider, WorkUnit};

/// 合成工作负载爬虫
///
/// 每个 关键字 × 国家 组合产生一个工作单元，处理时只做
/// 短暂等待并返回一个合成条目，不发出任何网络请求。
pub struct FixtureSpider;

impl FixtureSpider {
    pub fn boxed() -> Box<dyn Spider> {
        Box::new(FixtureSpider)
    }
}

#[async_trait]
impl Spider for FixtureSpider {
    fn name(&self) -> &str {
        "testspider"
    }

    fn produce_work(
        &mut self,
        snapshot: &ParameterSnapshot,
    ) -> Box<dyn Iterator<Item = WorkUnit> + Send> {
        let mut units = Vec::new();
        for keyword in &snapshot.keywords {
            for country in &snapshot.selected_countries {
                units.push(WorkUnit {
                    reference: format!("https://httpbin.org/anything?q={keyword}&gl={country}"),
                });
            }
        }
        Box::new(units.into_iter())
    }

    async fn process(&mut self, unit: WorkUnit) -> Option<Item> {
        // 模拟一次下游请求的耗时
        sleep(Duration::from_millis(25)).await;
        Some(Item {
            data: json!({
                "url": unit.reference,
                "title": "synthetic item",
            }),
        })
    }
}
