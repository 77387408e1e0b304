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

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::info;

use scrapeops::domain::models::snapshot::ParameterSnapshot;
use scrapeops::infrastructure::cache::redis_client::RedisClient;
use scrapeops::infrastructure::cancellation::RedisCancellationStore;
use scrapeops::spiders;
use scrapeops::workers::runtime;

/// 主函数
///
/// 工作进程入口点：从标准输入读取参数快照，运行对应的爬虫
/// 编排循环，并在退出前把终态报告作为单行JSON打印到标准输出。
/// 日志全部走标准错误，保证标准输出只携带报告。
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed reading parameter snapshot from stdin")?;
    let snapshot: ParameterSnapshot =
        serde_json::from_str(&input).context("invalid parameter snapshot")?;

    info!(
        "Worker starting for spider {} (job {})",
        snapshot.spider_name, snapshot.job_id
    );

    let mut spider = spiders::create(&snapshot.spider_name).with_context(|| {
        format!(
            "spider '{}' is not registered in this worker runtime",
            snapshot.spider_name
        )
    })?;

    let redis = RedisClient::new(&snapshot.redis_url).await?;
    let store = RedisCancellationStore::new(redis);

    let report = runtime::run_spider(spider.as_mut(), &snapshot, &store).await?;

    info!(
        "Worker done: {:?} with {} item(s)",
        report.status, report.items_scraped
    );
    println!("{}", serde_json::to_string(&report)?);

    Ok(())
}
