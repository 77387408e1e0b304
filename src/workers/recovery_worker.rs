use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::models::job::JobStatus;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::task_repository::TaskRepository;

/// 恢复工作器
///
/// 负责两类对账：
/// 1. 启动对账：控制面重启后，宽限期过后仍处于Running且
///    没有存活工作进程的孤儿作业被移入终态失败；
/// 2. 周期维护：重新入队锁过期的任务（至少一次重投递），
///    并将耗尽重投递额度的任务连同其作业一起终结。
pub struct RecoveryWorker<T, J>
where
    T: TaskRepository + Send + Sync + 'static,
    J: JobRepository + Send + Sync + 'static,
{
    task_repository: Arc<T>,
    job_repository: Arc<J>,
    interval: Duration,
    orphan_grace: Duration,
}

impl<T, J> RecoveryWorker<T, J>
where
    T: TaskRepository + Send + Sync + 'static,
    J: JobRepository + Send + Sync + 'static,
{
    pub fn new(
        task_repository: Arc<T>,
        job_repository: Arc<J>,
        interval: Duration,
        orphan_grace: Duration,
    ) -> Self {
        Self {
            task_repository,
            job_repository,
            interval,
            orphan_grace,
        }
    }

    /// 运行工作器
    pub async fn run(&self) {
        info!("Recovery worker started");

        // 启动时拍下Running作业快照：这些作业的工作进程随上一个
        // 控制面进程一起消亡，本进程不会为它们重新分发（作业已非
        // Pending），宽限期后仍Running即为孤儿。
        let orphan_candidates = match self.job_repository.list_by_status(JobStatus::Running).await
        {
            Ok(jobs) => jobs.into_iter().map(|j| j.id).collect::<Vec<_>>(),
            Err(e) => {
                error!("Failed listing running jobs at startup: {}", e);
                Vec::new()
            }
        };

        if !orphan_candidates.is_empty() {
            info!(
                "Found {} running job(s) at startup, reconciling after grace period",
                orphan_candidates.len()
            );
            tokio::time::sleep(self.orphan_grace).await;

            match self.reconcile_orphans(&orphan_candidates).await {
                Ok(count) => {
                    if count > 0 {
                        warn!("Reconciled {} orphaned running job(s)", count);
                    }
                }
                Err(e) => {
                    error!("Failed reconciling orphaned jobs: {}", e);
                }
            }
        }

        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;

            match self.task_repository.release_expired_locks().await {
                Ok(count) => {
                    if count > 0 {
                        info!("Requeued {} task(s) with expired locks", count);
                    }
                }
                Err(e) => {
                    error!("Failed releasing expired task locks: {}", e);
                }
            }

            match self.fail_exhausted().await {
                Ok(count) => {
                    if count > 0 {
                        warn!("Failed {} task(s) after exhausting redelivery", count);
                    }
                }
                Err(e) => {
                    error!("Failed expiring exhausted tasks: {}", e);
                }
            }
        }
    }

    /// 启动后台运行
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// 将启动时快照中仍处于Running的作业移入终态失败
    pub async fn reconcile_orphans(&self, candidates: &[uuid::Uuid]) -> Result<u64, String> {
        let mut reconciled = 0;
        for job_id in candidates {
            let transitioned = self
                .job_repository
                .transition(
                    *job_id,
                    &[JobStatus::Running],
                    JobStatus::Canceled,
                    Some("orphaned by control-plane restart"),
                )
                .await
                .map_err(|e| e.to_string())?;
            if transitioned {
                reconciled += 1;
            }
        }
        Ok(reconciled)
    }

    /// 终结耗尽重投递额度的任务及其作业
    pub async fn fail_exhausted(&self) -> Result<u64, String> {
        let exhausted = self
            .task_repository
            .fail_exhausted_tasks()
            .await
            .map_err(|e| e.to_string())?;

        let mut count = 0;
        for task in exhausted {
            // 原子转换保证重复的维护周期不会产生第二次终态写入
            let transitioned = self
                .job_repository
                .transition(
                    task.job_id,
                    &[JobStatus::Pending, JobStatus::Running],
                    JobStatus::Canceled,
                    Some("queue redelivery exhausted"),
                )
                .await
                .map_err(|e| e.to_string())?;

            if transitioned {
                warn!(
                    "Job {} moved to terminal failure after task {} exhausted redelivery",
                    task.job_id, task.id
                );
            }
            count += 1;
        }

        Ok(count)
    }
}
