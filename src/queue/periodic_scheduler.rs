// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::domain::models::job::Job;
use crate::domain::models::periodic_job::PeriodicJobDefinition;
use crate::domain::models::snapshot::ParameterSnapshot;
use crate::domain::repositories::job_repository::JobRepository;
use crate::domain::repositories::periodic_job_repository::PeriodicJobRepository;
use crate::queue::task_queue::TaskQueue;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// 调度器错误类型
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// 调度冲突：该定义已有一个激活的触发器，原有调度保持不变
    #[error("Schedule already armed for definition {0}")]
    Conflict(Uuid),

    /// 无效的触发间隔
    #[error("Invalid trigger interval: {0}")]
    InvalidInterval(String),

    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] crate::domain::repositories::job_repository::RepositoryError),

    /// 队列错误
    #[error("Queue error: {0}")]
    Queue(#[from] crate::queue::task_queue::QueueError),
}

/// 触发器类型
///
/// 以带标签的变体表达，当前仅支持固定间隔触发，
/// 预留扩展到Cron表达式的空间。
#[derive(Debug, Clone)]
pub enum Trigger {
    /// 固定间隔触发
    Interval {
        /// 触发周期
        every: Duration,
    },
}

impl Trigger {
    /// 由周期作业定义构造触发器
    pub fn from_definition(definition: &PeriodicJobDefinition) -> Result<Self, SchedulerError> {
        if definition.repeat_time <= 0 {
            return Err(SchedulerError::InvalidInterval(format!(
                "repeat_time must be positive, got {}",
                definition.repeat_time
            )));
        }
        Ok(Trigger::Interval {
            every: Duration::from_secs(definition.repeat_time as u64 * 60),
        })
    }

    fn period(&self) -> Duration {
        match self {
            Trigger::Interval { every } => *every,
        }
    }
}

struct ArmedTrigger {
    #[allow(dead_code)]
    trigger: Trigger,
    handle: JoinHandle<()>,
}

/// 触发执行所需的共享依赖，被每个触发器任务克隆持有
struct SchedulerCore<J, P, Q>
where
    J: JobRepository,
    P: PeriodicJobRepository,
    Q: TaskQueue,
{
    job_repository: Arc<J>,
    periodic_repository: Arc<P>,
    queue: Arc<Q>,
    scraper: ScraperSettings,
    redis_url: String,
}

impl<J, P, Q> SchedulerCore<J, P, Q>
where
    J: JobRepository,
    P: PeriodicJobRepository,
    Q: TaskQueue,
{
    /// 执行一次触发
    ///
    /// 防重叠检查与作业创建之间没有全局锁：重叠保护依赖
    /// 单调度器实例假设，检查命中即跳过本次触发。
    async fn fire(&self, definition_id: Uuid) -> Result<bool, SchedulerError> {
        // 每次触发都按定义行的当前设置构造作业
        let Some(definition) = self.periodic_repository.find_by_id(definition_id).await? else {
            warn!("Definition {} no longer exists, skipping fire", definition_id);
            return Ok(false);
        };

        if !definition.enabled {
            warn!(
                "Definition {} disabled since arming, skipping fire",
                definition_id
            );
            return Ok(false);
        }

        if self
            .job_repository
            .in_flight_exists_for_definition(definition_id)
            .await?
        {
            info!(
                "Skipping periodic fire for spider {}: previous job still in flight",
                definition.spider_name
            );
            return Ok(false);
        }

        let job = Job::new(
            definition.spider_name.clone(),
            definition.scrape_type,
            definition.use_proxies,
            definition.save_to_feed,
            definition.save_to_db,
        )
        .descended_from(definition.id);

        let job = self.job_repository.create(&job).await?;

        let snapshot = ParameterSnapshot {
            spider_name: definition.spider_name.clone(),
            scrape_type: definition.scrape_type,
            keywords: definition.keywords.clone(),
            selected_countries: definition.selected_countries.clone(),
            delay: self.scraper.delay,
            timeout: self.scraper.timeout,
            retries: self.scraper.retries,
            concurrent_requests: self.scraper.concurrent_requests,
            use_proxies: definition.use_proxies,
            save_to_feed: definition.save_to_feed,
            save_to_db: definition.save_to_db,
            job_id: job.id,
            task_id: None,
            redis_url: self.redis_url.clone(),
            log_file: None,
            feed_file: None,
        };

        let task = self.queue.enqueue(snapshot).await?;

        info!(
            "Periodic fire enqueued job {} (task {}) for spider {}",
            job.id, task.id, definition.spider_name
        );
        Ok(true)
    }
}

/// 周期作业调度器
///
/// 为每个启用的周期作业定义维护一个触发器。每次触发时，
/// 若该定义已有未到终态的派生作业则跳过本次触发（记录日志，
/// 不补偿排队），否则按定义的当前设置创建一个Pending作业
/// 并将其参数快照入队。触发彼此独立，计时漂移无关紧要。
pub struct PeriodicScheduler<J, P, Q>
where
    J: JobRepository + Send + Sync + 'static,
    P: PeriodicJobRepository + Send + Sync + 'static,
    Q: TaskQueue + Send + Sync + 'static,
{
    core: Arc<SchedulerCore<J, P, Q>>,
    armed: Mutex<HashMap<Uuid, ArmedTrigger>>,
}

impl<J, P, Q> PeriodicScheduler<J, P, Q>
where
    J: JobRepository + Send + Sync + 'static,
    P: PeriodicJobRepository + Send + Sync + 'static,
    Q: TaskQueue + Send + Sync + 'static,
{
    /// 创建新的周期作业调度器实例
    ///
    /// # 参数
    ///
    /// * `job_repository` - 作业仓库
    /// * `periodic_repository` - 周期作业定义仓库
    /// * `queue` - 任务队列
    /// * `scraper` - 爬虫默认参数
    /// * `redis_url` - 取消信号存储连接URL
    pub fn new(
        job_repository: Arc<J>,
        periodic_repository: Arc<P>,
        queue: Arc<Q>,
        scraper: ScraperSettings,
        redis_url: String,
    ) -> Self {
        Self {
            core: Arc::new(SchedulerCore {
                job_repository,
                periodic_repository,
                queue,
                scraper,
                redis_url,
            }),
            armed: Mutex::new(HashMap::new()),
        }
    }

    /// 注册一个定义的固定间隔触发器
    ///
    /// 首次触发发生在注册后一个完整周期。同一定义重复注册
    /// 返回调度冲突错误，已有的调度保持不变。
    ///
    /// # 参数
    ///
    /// * `definition` - 周期作业定义
    pub async fn arm(&self, definition: &PeriodicJobDefinition) -> Result<(), SchedulerError> {
        let trigger = Trigger::from_definition(definition)?;
        let mut armed = self.armed.lock().await;

        if armed.contains_key(&definition.id) {
            return Err(SchedulerError::Conflict(definition.id));
        }

        let period = trigger.period();
        let core = Arc::clone(&self.core);
        let definition_id = definition.id;
        let spider_name = definition.spider_name.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if let Err(e) = core.fire(definition_id).await {
                    error!(
                        "Periodic fire failed for spider {} ({}): {}",
                        spider_name, definition_id, e
                    );
                }
            }
        });

        armed.insert(definition_id, ArmedTrigger { trigger, handle });
        info!(
            "Armed periodic trigger for spider {} every {} minute(s)",
            definition.spider_name, definition.repeat_time
        );

        Ok(())
    }

    /// 取消一个定义的触发器
    ///
    /// # 返回值
    ///
    /// 返回是否存在被取消的触发器；对未注册的定义为无操作
    pub async fn disarm(&self, definition_id: Uuid) -> bool {
        let mut armed = self.armed.lock().await;
        match armed.remove(&definition_id) {
            Some(entry) => {
                entry.handle.abort();
                info!("Disarmed periodic trigger for definition {}", definition_id);
                true
            }
            None => {
                warn!(
                    "No armed trigger found for definition {}, nothing to disarm",
                    definition_id
                );
                false
            }
        }
    }

    /// 以新的定义设置替换触发器（幂等：先取消再注册）
    pub async fn replace(
        &self,
        definition: &PeriodicJobDefinition,
    ) -> Result<(), SchedulerError> {
        self.disarm(definition.id).await;
        self.arm(definition).await
    }

    /// 判断一个定义是否已注册触发器
    pub async fn is_armed(&self, definition_id: Uuid) -> bool {
        self.armed.lock().await.contains_key(&definition_id)
    }

    /// 启动对账：重新注册所有启用的定义
    ///
    /// 注册冲突作为可恢复错误记录日志，已有调度保持不变，
    /// 不会向调用方传播。
    pub async fn rearm_enabled(&self) -> Result<usize, SchedulerError> {
        let definitions = self.core.periodic_repository.list_enabled().await?;
        let mut rearmed = 0;

        for definition in &definitions {
            match self.arm(definition).await {
                Ok(()) => rearmed += 1,
                Err(SchedulerError::Conflict(id)) => {
                    warn!("Definition {} already armed, keeping existing schedule", id);
                }
                Err(e) => {
                    error!(
                        "Failed arming periodic job for spider {}: {}",
                        definition.spider_name, e
                    );
                }
            }
        }

        Ok(rearmed)
    }

    /// 立即执行一次触发（测试与手动运维入口）
    pub async fn fire(&self, definition_id: Uuid) -> Result<bool, SchedulerError> {
        self.core.fire(definition_id).await
    }
}
