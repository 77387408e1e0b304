// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Duration as ChronoDuration;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use uuid::Uuid;

use scrapeops::config::settings::{ArtifactSettings, DispatchSettings, ScraperSettings};
use scrapeops::domain::models::job::{Job, ScrapeType};
use scrapeops::domain::models::snapshot::ParameterSnapshot;
use scrapeops::domain::repositories::job_repository::JobRepository;
use scrapeops::infrastructure::cancellation::MemoryCancellationStore;
use scrapeops::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use scrapeops::infrastructure::repositories::periodic_job_repo_impl::PeriodicJobRepositoryImpl;
use scrapeops::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use scrapeops::queue::periodic_scheduler::PeriodicScheduler;
use scrapeops::queue::task_queue::PostgresTaskQueue;

pub type TestScheduler =
    PeriodicScheduler<JobRepositoryImpl, PeriodicJobRepositoryImpl, PostgresTaskQueue<TaskRepositoryImpl>>;

#[allow(dead_code)]
pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub job_repo: Arc<JobRepositoryImpl>,
    pub task_repo: Arc<TaskRepositoryImpl>,
    pub periodic_repo: Arc<PeriodicJobRepositoryImpl>,
    pub queue: Arc<PostgresTaskQueue<TaskRepositoryImpl>>,
    pub cancellation: Arc<MemoryCancellationStore>,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_queue_options(ChronoDuration::seconds(60), 3).await
}

pub async fn create_test_app_with_queue_options(
    visibility_timeout: ChronoDuration,
    max_retries: i32,
) -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(db);
    Migrator::up(db.as_ref(), None).await.unwrap();

    let job_repo = Arc::new(JobRepositoryImpl::new(db.clone()));
    let task_repo = Arc::new(TaskRepositoryImpl::new(db.clone(), visibility_timeout));
    let periodic_repo = Arc::new(PeriodicJobRepositoryImpl::new(db.clone()));
    let queue = Arc::new(PostgresTaskQueue::new(task_repo.clone(), max_retries));
    let cancellation = Arc::new(MemoryCancellationStore::new());

    TestApp {
        db,
        job_repo,
        task_repo,
        periodic_repo,
        queue,
        cancellation,
    }
}

pub fn scraper_settings() -> ScraperSettings {
    ScraperSettings {
        delay: 0,
        timeout: 30,
        retries: 2,
        concurrent_requests: 1,
    }
}

#[allow(dead_code)]
pub fn dispatch_settings(worker_command: &str) -> DispatchSettings {
    DispatchSettings {
        launcher_count: 1,
        worker_command: worker_command.to_string(),
        visibility_timeout_secs: 60,
        max_retries: 3,
        maintenance_interval_secs: 60,
        orphan_grace_secs: 0,
    }
}

#[allow(dead_code)]
pub fn artifact_settings(log_dir: &std::path::Path, feeds_dir: &std::path::Path) -> ArtifactSettings {
    ArtifactSettings {
        log_dir: log_dir.to_string_lossy().into_owned(),
        feeds_dir: feeds_dir.to_string_lossy().into_owned(),
    }
}

pub fn test_scheduler(app: &TestApp) -> Arc<TestScheduler> {
    Arc::new(PeriodicScheduler::new(
        app.job_repo.clone(),
        app.periodic_repo.clone(),
        app.queue.clone(),
        scraper_settings(),
        "redis://127.0.0.1:6379".to_string(),
    ))
}

pub fn snapshot_for(job: &Job) -> ParameterSnapshot {
    ParameterSnapshot {
        spider_name: job.spider_name.clone(),
        scrape_type: job.scrape_type,
        keywords: vec!["rust developer".to_string()],
        selected_countries: vec!["us".to_string()],
        delay: 0,
        timeout: 30,
        retries: 2,
        concurrent_requests: 1,
        use_proxies: job.use_proxies,
        save_to_feed: job.save_to_feed,
        save_to_db: job.save_to_db,
        job_id: job.id,
        task_id: None,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        log_file: None,
        feed_file: None,
    }
}

pub async fn create_pending_job(app: &TestApp, spider_name: &str) -> Job {
    let job = Job::new(spider_name.to_string(), ScrapeType::All, false, true, false);
    app.job_repo.create(&job).await.unwrap()
}

#[allow(dead_code)]
pub async fn create_running_job(app: &TestApp, spider_name: &str) -> Job {
    let job = create_pending_job(app, spider_name).await;
    let handle = Uuid::new_v4();
    assert!(app
        .job_repo
        .mark_dispatched(job.id, handle, chrono::Utc::now().into())
        .await
        .unwrap());
    app.job_repo.find_by_id(job.id).await.unwrap().unwrap()
}
