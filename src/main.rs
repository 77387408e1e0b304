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

use axum::Extension;
use chrono::Duration as ChronoDuration;
use scrapeops::application::usecases::cancel_job::CancelJobUseCase;
use scrapeops::application::usecases::delete_jobs::DeleteJobsUseCase;
use scrapeops::application::usecases::periodic_control::PeriodicControlUseCase;
use scrapeops::application::usecases::submit_jobs::SubmitJobsUseCase;
use scrapeops::config::settings::Settings;
use scrapeops::domain::repositories::periodic_job_repository::PeriodicJobRepository;
use scrapeops::infrastructure::cache::redis_client::RedisClient;
use scrapeops::infrastructure::cancellation::{CancellationStore, RedisCancellationStore};
use scrapeops::infrastructure::database::connection;
use scrapeops::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use scrapeops::infrastructure::repositories::periodic_job_repo_impl::PeriodicJobRepositoryImpl;
use scrapeops::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use scrapeops::presentation::routes;
use scrapeops::queue::periodic_scheduler::PeriodicScheduler;
use scrapeops::queue::task_queue::PostgresTaskQueue;
use scrapeops::workers::manager::WorkerManager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use migration::{Migrator, MigratorTrait};
use scrapeops::utils::telemetry;

/// 主函数
///
/// 控制面入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting scrapeops...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize Redis-backed cancellation store
    let redis_client = RedisClient::new(&settings.redis.url).await?;
    let cancellation: Arc<dyn CancellationStore> =
        Arc::new(RedisCancellationStore::new(redis_client));
    info!("Cancellation store initialized");

    // 5. Initialize repositories and queue
    let job_repo = Arc::new(JobRepositoryImpl::new(db.clone()));
    let task_repo = Arc::new(TaskRepositoryImpl::new(
        db.clone(),
        ChronoDuration::seconds(settings.dispatch.visibility_timeout_secs as i64),
    ));
    let periodic_repo = Arc::new(PeriodicJobRepositoryImpl::new(db.clone()));
    let queue = Arc::new(PostgresTaskQueue::new(
        task_repo.clone(),
        settings.dispatch.max_retries,
    ));

    // 6. Seed periodic definitions for every known spider and re-arm
    // the enabled ones
    let known_spiders = settings.spiders.known_spiders();
    let seeded = periodic_repo.sync_known_spiders(&known_spiders).await?;
    if seeded > 0 {
        info!("Seeded {} periodic job definition(s)", seeded);
    }

    let scheduler = Arc::new(PeriodicScheduler::new(
        job_repo.clone(),
        periodic_repo.clone(),
        queue.clone(),
        settings.scraper.clone(),
        settings.redis.url.clone(),
    ));
    let rearmed = scheduler.rearm_enabled().await?;
    info!("Re-armed {} periodic job(s)", rearmed);

    // 7. Start launcher loops and the recovery worker
    let mut worker_manager = WorkerManager::new(
        queue.clone(),
        task_repo.clone(),
        job_repo.clone(),
        cancellation.clone(),
        settings.dispatch.clone(),
        settings.artifacts.clone(),
    );
    worker_manager.start_workers().await;

    // 8. Build use cases
    let submit = Arc::new(SubmitJobsUseCase::new(
        job_repo.clone(),
        queue.clone(),
        settings.scraper.clone(),
        settings.redis.url.clone(),
        known_spiders,
    ));
    let cancel = Arc::new(CancelJobUseCase::new(job_repo.clone(), cancellation.clone()));
    let delete = Arc::new(DeleteJobsUseCase::new(job_repo.clone(), &settings.artifacts));
    let periodic_control = Arc::new(PeriodicControlUseCase::new(
        periodic_repo.clone(),
        scheduler.clone(),
    ));

    // 9. Start HTTP server
    let app = routes::routes()
        .layer(Extension(submit))
        .layer(Extension(cancel))
        .layer(Extension(delete))
        .layer(Extension(periodic_control))
        .layer(Extension(job_repo.clone()))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
