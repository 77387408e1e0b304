use super::helpers::{
    artifact_settings, create_pending_job, create_test_app, dispatch_settings, snapshot_for,
};
use scrapeops::application::usecases::cancel_job::CancelJobUseCase;
use scrapeops::domain::models::job::JobStatus;
use scrapeops::domain::models::task::TaskStatus;
use scrapeops::domain::repositories::job_repository::JobRepository;
use scrapeops::domain::repositories::task_repository::TaskRepository;
use scrapeops::queue::task_queue::TaskQueue;
use scrapeops::workers::launcher::LauncherWorker;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

/// Writes an executable stand-in for the worker binary: drains stdin,
/// optionally sleeps, then prints the given report line (or exits nonzero).
fn fake_worker(dir: &Path, body: &str) -> String {
    let path = dir.join("fake-worker.sh");
    std::fs::write(&path, format!("#!/bin/sh\ncat > /dev/null\n{body}\n")).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path.to_string_lossy().into_owned()
}

fn launcher_for(
    app: &super::helpers::TestApp,
    worker_command: &str,
    dirs: (&Path, &Path),
) -> LauncherWorker<
    scrapeops::queue::task_queue::PostgresTaskQueue<
        scrapeops::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl,
    >,
    scrapeops::infrastructure::repositories::job_repo_impl::JobRepositoryImpl,
> {
    LauncherWorker::new(
        app.queue.clone(),
        app.job_repo.clone(),
        app.cancellation.clone(),
        dispatch_settings(worker_command),
        artifact_settings(dirs.0, dirs.1),
    )
}

#[tokio::test]
async fn test_dispatch_settles_finished_job_with_item_count() {
    let app = create_test_app().await;
    let dir = TempDir::new().unwrap();
    let worker = fake_worker(
        dir.path(),
        r#"echo '{"status":"finished","items_scraped":7}'"#,
    );
    let launcher = launcher_for(&app, &worker, (dir.path(), dir.path()));

    let job = create_pending_job(&app, "testspider").await;
    app.queue.enqueue(snapshot_for(&job)).await.unwrap();
    let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    let task_id = task.id;

    launcher.dispatch(task).await.unwrap();

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Finished);
    assert_eq!(job.items_scraped, 7);
    assert_eq!(job.task_handle, Some(task_id));
    assert!(job.date_started.is_some());
    assert!(job.date_finished.is_some());

    let task = app.task_repo.find_by_id(task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_dispatch_settles_canceled_report() {
    let app = create_test_app().await;
    let dir = TempDir::new().unwrap();
    let worker = fake_worker(
        dir.path(),
        r#"echo '{"status":"canceled","items_scraped":3}'"#,
    );
    let launcher = launcher_for(&app, &worker, (dir.path(), dir.path()));

    let job = create_pending_job(&app, "testspider").await;
    app.queue.enqueue(snapshot_for(&job)).await.unwrap();
    let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();

    launcher.dispatch(task).await.unwrap();

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    assert_eq!(job.items_scraped, 3);
}

#[tokio::test]
async fn test_spawn_failure_cancels_job_without_retry() {
    let app = create_test_app().await;
    let dir = TempDir::new().unwrap();
    let launcher = launcher_for(
        &app,
        "/nonexistent/scrapeops-worker",
        (dir.path(), dir.path()),
    );

    let job = create_pending_job(&app, "testspider").await;
    app.queue.enqueue(snapshot_for(&job)).await.unwrap();
    let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    let task_id = task.id;

    launcher.dispatch(task).await.unwrap();

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    assert!(job
        .failure_reason
        .as_deref()
        .unwrap()
        .starts_with("worker launch failed"));
    // The job never ran
    assert!(job.date_started.is_none());

    // Non-retryable: the task is failed permanently, not requeued
    let task = app.task_repo.find_by_id(task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
}

#[tokio::test]
async fn test_worker_crash_without_report_cancels_job() {
    let app = create_test_app().await;
    let dir = TempDir::new().unwrap();
    let worker = fake_worker(dir.path(), "exit 1");
    let launcher = launcher_for(&app, &worker, (dir.path(), dir.path()));

    let job = create_pending_job(&app, "testspider").await;
    app.queue.enqueue(snapshot_for(&job)).await.unwrap();
    let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    let task_id = task.id;

    launcher.dispatch(task).await.unwrap();

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    assert_eq!(
        job.failure_reason.as_deref(),
        Some("worker exited without report")
    );

    let task = app.task_repo.find_by_id(task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_job_canceled_while_queued_is_not_dispatched() {
    let app = create_test_app().await;
    let dir = TempDir::new().unwrap();
    let worker = fake_worker(
        dir.path(),
        r#"echo '{"status":"finished","items_scraped":9}'"#,
    );
    let launcher = launcher_for(&app, &worker, (dir.path(), dir.path()));

    let job = create_pending_job(&app, "testspider").await;
    app.queue.enqueue(snapshot_for(&job)).await.unwrap();

    // Operator cancels before any launcher picks the task up
    let cancel = CancelJobUseCase::new(
        app.job_repo.clone(),
        app.cancellation.clone() as Arc<dyn scrapeops::infrastructure::cancellation::CancellationStore>,
    );
    assert!(cancel.execute(job.id).await.unwrap());

    let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();
    let task_id = task.id;
    launcher.dispatch(task).await.unwrap();

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    // Never dispatched: no handle, no start timestamp, no finished report
    assert!(job.task_handle.is_none());
    assert_eq!(job.items_scraped, 0);

    let task = app.task_repo.find_by_id(task_id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_cancel_during_run_beats_late_finished_report() {
    let app = create_test_app().await;
    let dir = TempDir::new().unwrap();
    // The worker reports a normal finish, but only after a delay that
    // gives the operator time to cancel
    let worker = fake_worker(
        dir.path(),
        r#"sleep 1
echo '{"status":"finished","items_scraped":5}'"#,
    );
    let launcher = Arc::new(launcher_for(&app, &worker, (dir.path(), dir.path())));

    let job = create_pending_job(&app, "testspider").await;
    app.queue.enqueue(snapshot_for(&job)).await.unwrap();
    let task = app.queue.dequeue(Uuid::new_v4()).await.unwrap().unwrap();

    let dispatch_handle = {
        let launcher = launcher.clone();
        tokio::spawn(async move { launcher.dispatch(task).await })
    };

    // Wait for the job to be marked running, then cancel mid-flight
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let current = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
        if current.status == JobStatus::Running {
            break;
        }
    }
    let cancel = CancelJobUseCase::new(
        app.job_repo.clone(),
        app.cancellation.clone() as Arc<dyn scrapeops::infrastructure::cancellation::CancellationStore>,
    );
    assert!(cancel.execute(job.id).await.unwrap());

    dispatch_handle.await.unwrap().unwrap();

    // The late finished report must not overwrite the cancellation
    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    // The item count from the report is still recorded
    assert_eq!(job.items_scraped, 5);
}
