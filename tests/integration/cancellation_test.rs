use super::helpers::{create_pending_job, create_running_job, create_test_app, snapshot_for};
use scrapeops::application::usecases::cancel_job::CancelJobUseCase;
use scrapeops::domain::models::job::JobStatus;
use scrapeops::domain::repositories::job_repository::JobRepository;
use scrapeops::infrastructure::cancellation::{
    stop_key, CancellationStore, MemoryCancellationStore,
};
use scrapeops::queue::task_queue::TaskQueue;
use scrapeops::utils::errors::AppError;
use scrapeops::workers::runtime::{run_spider, Item, ReportStatus, Spider, WorkUnit};
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_store_operations_are_idempotent() {
    let store = MemoryCancellationStore::new();
    let task_id = Uuid::new_v4();

    assert!(!store.is_stopped("indeed", task_id).await.unwrap());

    store.request_stop("indeed", task_id).await.unwrap();
    store.request_stop("indeed", task_id).await.unwrap();
    assert!(store.is_stopped("indeed", task_id).await.unwrap());

    // Keys are scoped per spider
    assert!(!store.is_stopped("testspider", task_id).await.unwrap());

    store.clear("indeed", task_id).await.unwrap();
    store.clear("indeed", task_id).await.unwrap();
    assert!(!store.is_stopped("indeed", task_id).await.unwrap());
}

#[test]
fn test_stop_key_wire_form() {
    assert_eq!(stop_key("indeed"), "indeed:stop");
}

#[tokio::test]
async fn test_stop_request_for_unknown_task_changes_nothing() {
    let app = create_test_app().await;
    let job = create_running_job(&app, "indeed").await;

    // A stray signal keyed to a task no job owns is simply absorbed
    app.cancellation
        .request_stop("indeed", Uuid::new_v4())
        .await
        .unwrap();

    let unchanged = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, JobStatus::Running);
}

#[tokio::test]
async fn test_cancel_after_finish_is_absorbed() {
    let app = create_test_app().await;
    let job = create_running_job(&app, "indeed").await;
    app.job_repo
        .transition(job.id, &[JobStatus::Running], JobStatus::Finished, None)
        .await
        .unwrap();

    let cancel = CancelJobUseCase::new(app.job_repo.clone(), app.cancellation.clone());
    let canceled = cancel.execute(job.id).await.unwrap();

    assert!(!canceled);
    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Finished);
}

#[tokio::test]
async fn test_cancel_unknown_job_is_an_error() {
    let app = create_test_app().await;
    let cancel = CancelJobUseCase::new(app.job_repo.clone(), app.cancellation.clone());

    match cancel.execute(Uuid::new_v4()).await {
        Err(AppError::NotFound(_)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

/// Spider that processes units until it is cooperatively stopped.
struct CountingSpider {
    processed: usize,
}

#[async_trait::async_trait]
impl Spider for CountingSpider {
    fn name(&self) -> &str {
        "indeed"
    }

    fn produce_work(
        &mut self,
        snapshot: &scrapeops::domain::models::snapshot::ParameterSnapshot,
    ) -> Box<dyn Iterator<Item = WorkUnit> + Send> {
        let units: Vec<WorkUnit> = snapshot
            .keywords
            .iter()
            .map(|kw| WorkUnit {
                reference: kw.clone(),
            })
            .collect();
        Box::new(units.into_iter())
    }

    async fn process(&mut self, _unit: WorkUnit) -> Option<Item> {
        self.processed += 1;
        Some(Item {
            data: serde_json::json!({}),
        })
    }
}

#[tokio::test]
async fn test_cancel_running_job_end_to_end() {
    let app = create_test_app().await;

    // Submission path: pending job + enqueued snapshot
    let job = create_pending_job(&app, "indeed").await;
    let mut snapshot = snapshot_for(&job);
    snapshot.keywords = (0..6).map(|i| format!("kw{i}")).collect();
    app.queue.enqueue(snapshot).await.unwrap();
    let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();

    // Dispatch: the job goes running under the task handle
    assert!(app
        .job_repo
        .mark_dispatched(job.id, task.id, chrono::Utc::now().into())
        .await
        .unwrap());

    // Operator cancel resolves the job to (spider, task) and flags the store
    let cancel = CancelJobUseCase::new(app.job_repo.clone(), app.cancellation.clone());
    assert!(cancel.execute(job.id).await.unwrap());
    assert!(app
        .cancellation
        .is_stopped("indeed", task.id)
        .await
        .unwrap());

    // The worker's next poll observes the stop before the first unit
    let mut spider = CountingSpider { processed: 0 };
    let store: Arc<MemoryCancellationStore> = app.cancellation.clone();
    let report = run_spider(&mut spider, &task.snapshot, store.as_ref())
        .await
        .unwrap();

    assert_eq!(report.status, ReportStatus::Canceled);
    assert_eq!(report.items_scraped, 0);

    // Launcher-side settlement: count recorded, cancel kept, entry cleared
    app.job_repo
        .record_result(job.id, report.items_scraped)
        .await
        .unwrap();
    assert!(!app
        .job_repo
        .transition(job.id, &[JobStatus::Running], JobStatus::Canceled, None)
        .await
        .unwrap());
    app.cancellation.clear("indeed", task.id).await.unwrap();
    app.queue.complete(task.id).await.unwrap();

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    assert_eq!(job.items_scraped, 0);
    assert!(!app
        .cancellation
        .is_stopped("indeed", task.id)
        .await
        .unwrap());
}
