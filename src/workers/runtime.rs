// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::models::snapshot::ParameterSnapshot;
use crate::infrastructure::cancellation::{CancellationError, CancellationStore};

/// 一个离散的工作单元，例如一次下游请求的目标
#[derive(Debug, Clone)]
pub struct WorkUnit {
    /// 工作单元的引用标识，例如目标URL或查询描述
    pub reference: String,
}

/// 抓取到的单个条目
#[derive(Debug, Clone)]
pub struct Item {
    /// 条目数据
    pub data: serde_json::Value,
}

/// 爬虫能力特质
///
/// 工作进程运行时的窄接口：惰性生成工作单元，逐个处理。
/// 取消轮询由编排循环持有，而不是爬虫实现：循环决定
/// 何时查询取消信号存储。
#[async_trait]
pub trait Spider: Send {
    /// 爬虫名称
    fn name(&self) -> &str;

    /// 由参数快照惰性生成工作单元序列
    fn produce_work(
        &mut self,
        snapshot: &ParameterSnapshot,
    ) -> Box<dyn Iterator<Item = WorkUnit> + Send>;

    /// 处理单个工作单元
    ///
    /// # 返回值
    ///
    /// 返回抓取到的条目；该单元没有产出时返回None
    async fn process(&mut self, unit: WorkUnit) -> Option<Item>;
}

/// 工作进程终态报告状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// 工作单元正常耗尽
    Finished,
    /// 观察到停止请求后终止
    Canceled,
}

/// 工作进程终态报告
///
/// 工作进程退出前在标准输出上打印的单行JSON，
/// 由启动器读取并写回作业注册表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReport {
    /// 终态状态
    pub status: ReportStatus,
    /// 累计抓取条目数
    pub items_scraped: i32,
}

/// 运行时错误类型
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    /// 快照缺少任务ID，未经过入队流程
    #[error("Snapshot carries no task id")]
    MissingTaskId,

    /// 取消信号存储错误
    #[error(transparent)]
    Cancellation(#[from] CancellationError),
}

/// 运行一个爬虫直到工作耗尽或观察到停止请求
///
/// 编排循环在处理每个工作单元之前查询取消信号存储；
/// 命中停止标记时立即停止发出后续工作单元，以此前累计的
/// 条目数报告Canceled。取消因此是协作式的，延迟以单个
/// 工作单元的粒度为界。运行时从不直接查询作业注册表。
pub async fn run_spider<S>(
    spider: &mut S,
    snapshot: &ParameterSnapshot,
    store: &dyn CancellationStore,
) -> Result<WorkerReport, RuntimeError>
where
    S: Spider + ?Sized,
{
    let task_id = snapshot.task_id.ok_or(RuntimeError::MissingTaskId)?;
    let mut items_scraped = 0;

    let work = spider.produce_work(snapshot);

    for unit in work {
        if store.is_stopped(&snapshot.spider_name, task_id).await? {
            info!(
                "Stop requested for spider {} task {}, reporting {} item(s)",
                snapshot.spider_name, task_id, items_scraped
            );
            return Ok(WorkerReport {
                status: ReportStatus::Canceled,
                items_scraped,
            });
        }

        if spider.process(unit).await.is_some() {
            items_scraped += 1;
        }
    }

    Ok(WorkerReport {
        status: ReportStatus::Finished,
        items_scraped,
    })
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;
