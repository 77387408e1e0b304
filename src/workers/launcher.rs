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
use chrono::{DateTime, FixedOffset, Utc};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::settings::{ArtifactSettings, DispatchSettings};
use crate::domain::models::job::JobStatus;
use crate::domain::models::task::Task;
use crate::domain::repositories::job_repository::JobRepository;
use crate::infrastructure::artifacts;
use crate::infrastructure::cancellation::CancellationStore;
use crate::queue::task_queue::TaskQueue;
use crate::workers::runtime::{ReportStatus, WorkerReport};

/// 启动器工作器
///
/// 从任务队列取走任务，为每个任务启动一个隔离的工作进程，
/// 进程退出后读取其终态报告并对账作业注册表。作业注册表上
/// 的所有写入都经过带状态条件的原子转换：取消请求先到时，
/// 迟到的完成报告不会覆盖Canceled。
pub struct LauncherWorker<Q, J>
where
    Q: TaskQueue + Send + Sync,
    J: JobRepository + Send + Sync,
{
    queue: Arc<Q>,
    job_repository: Arc<J>,
    cancellation: Arc<dyn CancellationStore>,
    dispatch: DispatchSettings,
    artifacts: ArtifactSettings,
    launcher_id: Uuid,
}

impl<Q, J> LauncherWorker<Q, J>
where
    Q: TaskQueue + Send + Sync,
    J: JobRepository + Send + Sync,
{
    /// 创建新的启动器工作器实例
    pub fn new(
        queue: Arc<Q>,
        job_repository: Arc<J>,
        cancellation: Arc<dyn CancellationStore>,
        dispatch: DispatchSettings,
        artifacts: ArtifactSettings,
    ) -> Self {
        Self {
            queue,
            job_repository,
            cancellation,
            dispatch,
            artifacts,
            launcher_id: Uuid::new_v4(),
        }
    }

    /// 运行启动器循环
    pub async fn run(&self) {
        info!("Launcher {} started", self.launcher_id);

        loop {
            match self.process_next_task().await {
                Ok(processed) => {
                    if !processed {
                        sleep(Duration::from_secs(1)).await;
                    }
                }
                Err(e) => {
                    error!("Error dispatching task: {}", e);
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn process_next_task(&self) -> Result<bool> {
        let task_opt = self.queue.dequeue(self.launcher_id).await?;

        if let Some(task) = task_opt {
            self.dispatch(task).await?;
            return Ok(true);
        }

        Ok(false)
    }

    /// 分发单个任务
    ///
    /// 启动工作进程，将参数快照写入其标准输入，等待退出后
    /// 从标准输出读取终态报告并落账。进程无法启动时，作业
    /// 以启动失败原因取消且任务不再投递（与队列重投递区分，
    /// 属于不可重试类别）。
    #[instrument(skip(self, task), fields(task_id = %task.id, job_id = %task.job_id, spider = %task.snapshot.spider_name))]
    pub async fn dispatch(&self, task: Task) -> Result<()> {
        info!("Dispatching task");

        let date_started: DateTime<FixedOffset> = Utc::now().into();
        let snapshot = self.dispatch_snapshot(&task, date_started);
        let payload =
            serde_json::to_string(&snapshot).context("failed serializing parameter snapshot")?;

        let spawned = Command::new(&self.dispatch.worker_command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                error!(
                    "Failed spawning worker process '{}': {}",
                    self.dispatch.worker_command, e
                );
                // 不可重试：作业直接进入终态，任务永久失败
                self.job_repository
                    .transition(
                        task.job_id,
                        &[JobStatus::Pending],
                        JobStatus::Canceled,
                        Some(&format!("worker launch failed: {e}")),
                    )
                    .await?;
                self.queue.fail(task.id).await?;
                return Ok(());
            }
        };

        let dispatched = self
            .job_repository
            .mark_dispatched(task.job_id, task.id, date_started)
            .await?;

        if !dispatched {
            // 作业在排队期间已被取消（或不存在）：确认任务并回收进程
            warn!("Job no longer pending, skipping dispatch");
            if let Err(e) = child.kill().await {
                warn!("Failed killing worker for skipped task: {}", e);
            }
            self.queue.complete(task.id).await?;
            return Ok(());
        }

        let output = match run_worker(child, &payload).await {
            Ok(output) => output,
            Err(e) => {
                // 作业已标记Running，必须就地解析到终态，不能留给队列
                warn!("Worker dispatch failed: {}", e);
                self.job_repository
                    .transition(
                        task.job_id,
                        &[JobStatus::Running],
                        JobStatus::Canceled,
                        Some(&format!("worker dispatch failed: {e}")),
                    )
                    .await?;
                self.cleanup(&task).await?;
                return Ok(());
            }
        };

        let report = parse_report(&output.stdout);

        match report {
            Some(report) if output.status.success() => {
                self.settle(&task, report).await?;
            }
            _ => {
                warn!(
                    "Worker exited without a valid report (status {:?})",
                    output.status.code()
                );
                self.job_repository
                    .transition(
                        task.job_id,
                        &[JobStatus::Running],
                        JobStatus::Canceled,
                        Some("worker exited without report"),
                    )
                    .await?;
                self.cleanup(&task).await?;
            }
        }

        Ok(())
    }

    fn dispatch_snapshot(
        &self,
        task: &Task,
        date_started: DateTime<FixedOffset>,
    ) -> crate::domain::models::snapshot::ParameterSnapshot {
        let snapshot = task.snapshot.clone();
        let log_file = artifacts::log_file_path(
            Path::new(&self.artifacts.log_dir),
            &snapshot.spider_name,
            date_started,
        );
        let feed_file = snapshot.save_to_feed.then(|| {
            artifacts::feed_file_path(
                Path::new(&self.artifacts.feeds_dir),
                &snapshot.spider_name,
                date_started,
            )
            .to_string_lossy()
            .into_owned()
        });

        snapshot.with_artifacts(log_file.to_string_lossy().into_owned(), feed_file)
    }

    async fn settle(&self, task: &Task, report: WorkerReport) -> Result<()> {
        self.job_repository
            .record_result(task.job_id, report.items_scraped)
            .await?;

        let reported_status = match report.status {
            ReportStatus::Finished => JobStatus::Finished,
            ReportStatus::Canceled => JobStatus::Canceled,
        };

        let transitioned = self
            .job_repository
            .transition(task.job_id, &[JobStatus::Running], reported_status, None)
            .await?;

        if transitioned {
            info!(
                "Job settled as {} with {} item(s)",
                reported_status, report.items_scraped
            );
        } else {
            // 取消先到：保留Canceled，报告只用于条目计数
            info!("Late worker report ignored, job already terminal");
        }

        self.cleanup(task).await
    }

    async fn cleanup(&self, task: &Task) -> Result<()> {
        if let Err(e) = self
            .cancellation
            .clear(&task.snapshot.spider_name, task.id)
            .await
        {
            warn!("Failed clearing cancellation entry: {}", e);
        }
        self.queue.complete(task.id).await?;
        Ok(())
    }
}

/// 把参数快照写入工作进程标准输入并等待其退出
async fn run_worker(
    mut child: tokio::process::Child,
    payload: &str,
) -> Result<std::process::Output> {
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(payload.as_bytes())
            .await
            .context("failed writing snapshot to worker stdin")?;
        // 关闭标准输入，让工作进程读到EOF
        drop(stdin);
    }

    child
        .wait_with_output()
        .await
        .context("failed awaiting worker process")
}

/// 解析工作进程标准输出中最后一个非空行的终态报告
fn parse_report(stdout: &[u8]) -> Option<WorkerReport> {
    let text = String::from_utf8_lossy(stdout);
    let line = text.lines().rev().find(|line| !line.trim().is_empty())?;
    serde_json::from_str(line.trim()).ok()
}

#[cfg(test)]
#[path = "launcher_parse_test.rs"]
mod tests;
