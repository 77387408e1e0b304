use super::helpers::{
    create_pending_job, create_test_app, create_test_app_with_queue_options, snapshot_for,
};
use chrono::Duration as ChronoDuration;
use scrapeops::domain::models::job::JobStatus;
use scrapeops::domain::models::task::TaskStatus;
use scrapeops::domain::repositories::job_repository::JobRepository;
use scrapeops::domain::repositories::task_repository::TaskRepository;
use scrapeops::queue::task_queue::TaskQueue;
use scrapeops::workers::recovery_worker::RecoveryWorker;
use std::time::Duration;
use uuid::Uuid;

#[tokio::test]
async fn test_enqueue_assigns_task_id_into_snapshot() {
    let app = create_test_app().await;
    let job = create_pending_job(&app, "indeed").await;

    let task = app.queue.enqueue(snapshot_for(&job)).await.unwrap();

    assert_eq!(task.status, TaskStatus::Queued);
    assert_eq!(task.job_id, job.id);
    assert_eq!(task.snapshot.task_id, Some(task.id));
    assert_eq!(task.attempt_count, 0);
}

#[tokio::test]
async fn test_dequeue_is_fifo_per_producer() {
    let app = create_test_app().await;
    let job_a = create_pending_job(&app, "indeed").await;
    let job_b = create_pending_job(&app, "testspider").await;

    let task_a = app.queue.enqueue(snapshot_for(&job_a)).await.unwrap();
    let task_b = app.queue.enqueue(snapshot_for(&job_b)).await.unwrap();

    let first = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    let second = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(first.id, task_a.id);
    assert_eq!(second.id, task_b.id);

    // Queue drained
    assert!(app.queue.dequeue(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_dequeue_locks_and_counts_attempts() {
    let app = create_test_app().await;
    let job = create_pending_job(&app, "indeed").await;
    app.queue.enqueue(snapshot_for(&job)).await.unwrap();

    let launcher_id = Uuid::new_v4();
    let task = app.queue.dequeue(launcher_id).await.unwrap().unwrap();

    assert_eq!(task.status, TaskStatus::Active);
    assert_eq!(task.lock_token, Some(launcher_id));
    assert!(task.lock_expires_at.is_some());
    assert_eq!(task.attempt_count, 1);

    // A locked task is not handed out twice
    assert!(app.queue.dequeue(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_lock_is_redelivered_in_fifo_order() {
    // Zero visibility timeout: a dequeued task expires immediately
    let app = create_test_app_with_queue_options(ChronoDuration::seconds(0), 3).await;
    let job = create_pending_job(&app, "indeed").await;
    let task = app.queue.enqueue(snapshot_for(&job)).await.unwrap();

    let first = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(first.attempt_count, 1);

    let requeued = app.task_repo.release_expired_locks().await.unwrap();
    assert_eq!(requeued, 1);

    let second = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    assert_eq!(second.id, task.id);
    assert_eq!(second.attempt_count, 2);
}

#[tokio::test]
async fn test_completed_and_failed_tasks_are_not_redelivered() {
    let app = create_test_app_with_queue_options(ChronoDuration::seconds(0), 3).await;
    let job_a = create_pending_job(&app, "indeed").await;
    let job_b = create_pending_job(&app, "testspider").await;
    let task_a = app.queue.enqueue(snapshot_for(&job_a)).await.unwrap();
    let task_b = app.queue.enqueue(snapshot_for(&job_b)).await.unwrap();

    app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    app.queue.complete(task_a.id).await.unwrap();
    app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    app.queue.fail(task_b.id).await.unwrap();

    assert_eq!(app.task_repo.release_expired_locks().await.unwrap(), 0);
    assert!(app.queue.dequeue(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_redelivery_exhaustion_terminates_job_exactly_once() {
    // Max three deliveries, all of which go unacknowledged
    let app = create_test_app_with_queue_options(ChronoDuration::seconds(0), 3).await;
    let job = create_pending_job(&app, "indeed").await;
    let enqueued = app.queue.enqueue(snapshot_for(&job)).await.unwrap();

    for attempt in 1..=3 {
        let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
        assert_eq!(task.attempt_count, attempt);
        if attempt < 3 {
            assert_eq!(app.task_repo.release_expired_locks().await.unwrap(), 1);
        }
    }

    // The third expired delivery has no redelivery budget left
    assert_eq!(app.task_repo.release_expired_locks().await.unwrap(), 0);

    let recovery = RecoveryWorker::new(
        app.task_repo.clone(),
        app.job_repo.clone(),
        Duration::from_secs(60),
        Duration::from_secs(0),
    );

    let failed = recovery.fail_exhausted().await.unwrap();
    assert_eq!(failed, 1);

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    assert_eq!(
        job.failure_reason.as_deref(),
        Some("queue redelivery exhausted")
    );

    // Repeated maintenance cycles must not produce a second terminal write
    let failed = recovery.fail_exhausted().await.unwrap();
    assert_eq!(failed, 0);

    // The task itself is Failed, never requeued
    let task = app
        .task_repo
        .find_by_id(enqueued.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_orphaned_running_jobs_reconciled_after_restart() {
    let app = create_test_app().await;

    let orphan = super::helpers::create_running_job(&app, "indeed").await;
    let finished = super::helpers::create_running_job(&app, "testspider").await;
    app.job_repo
        .transition(finished.id, &[JobStatus::Running], JobStatus::Finished, None)
        .await
        .unwrap();

    let recovery = RecoveryWorker::new(
        app.task_repo.clone(),
        app.job_repo.clone(),
        Duration::from_secs(60),
        Duration::from_secs(0),
    );

    // The startup snapshot contained both; only the one still running is
    // moved to terminal failure
    let reconciled = recovery
        .reconcile_orphans(&[orphan.id, finished.id])
        .await
        .unwrap();
    assert_eq!(reconciled, 1);

    let orphan = app.job_repo.find_by_id(orphan.id).await.unwrap().unwrap();
    assert_eq!(orphan.status, JobStatus::Canceled);
    assert_eq!(
        orphan.failure_reason.as_deref(),
        Some("orphaned by control-plane restart")
    );

    let finished = app.job_repo.find_by_id(finished.id).await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Finished);
}
