// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::settings::{ArtifactSettings, DispatchSettings};
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::infrastructure::cancellation::CancellationStore;
use crate::queue::task_queue::TaskQueue;
use crate::workers::launcher::LauncherWorker;
use crate::workers::recovery_worker::RecoveryWorker;

/// 工作管理器
///
/// 负责启动器循环与恢复工作器的生命周期
pub struct WorkerManager<Q, T, J>
where
    Q: TaskQueue + 'static,
    T: TaskRepository + 'static,
    J: JobRepository + 'static,
{
    queue: Arc<Q>,
    task_repository: Arc<T>,
    job_repository: Arc<J>,
    cancellation: Arc<dyn CancellationStore>,
    dispatch: DispatchSettings,
    artifacts: ArtifactSettings,
    handles: Vec<JoinHandle<()>>,
}

impl<Q, T, J> WorkerManager<Q, T, J>
where
    Q: TaskQueue + Send + Sync,
    T: TaskRepository + Send + Sync,
    J: JobRepository + Send + Sync,
{
    pub fn new(
        queue: Arc<Q>,
        task_repository: Arc<T>,
        job_repository: Arc<J>,
        cancellation: Arc<dyn CancellationStore>,
        dispatch: DispatchSettings,
        artifacts: ArtifactSettings,
    ) -> Self {
        Self {
            queue,
            task_repository,
            job_repository,
            cancellation,
            dispatch,
            artifacts,
            handles: Vec::new(),
        }
    }

    /// 启动工作器
    ///
    /// 启动配置数量的启动器循环和一个恢复工作器
    pub async fn start_workers(&mut self) {
        for _ in 0..self.dispatch.launcher_count {
            let launcher = LauncherWorker::new(
                self.queue.clone(),
                self.job_repository.clone(),
                self.cancellation.clone(),
                self.dispatch.clone(),
                self.artifacts.clone(),
            );

            // We spawn the launcher loop on a separate task to avoid blocking
            // the main thread or the loop that spawns workers.
            let handle = tokio::spawn(async move {
                launcher.run().await;
            });
            self.handles.push(handle);
        }

        let recovery = RecoveryWorker::new(
            self.task_repository.clone(),
            self.job_repository.clone(),
            Duration::from_secs(self.dispatch.maintenance_interval_secs),
            Duration::from_secs(self.dispatch.orphan_grace_secs),
        );
        self.handles.push(recovery.start());
    }

    /// 等待关闭信号并关闭工作器
    ///
    /// 监听关闭信号并优雅地关闭所有工作器循环
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        info!("Shutting down workers...");
        for handle in &self.handles {
            handle.abort();
        }

        info!("Workers shut down successfully");
    }
}
