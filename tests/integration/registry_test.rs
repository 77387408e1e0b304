use super::helpers::{create_pending_job, create_test_app};
use chrono::Utc;
use scrapeops::application::dto::submit_request::DeleteJobsRequestDto;
use scrapeops::application::usecases::delete_jobs::DeleteJobsUseCase;
use scrapeops::domain::models::job::JobStatus;
use scrapeops::domain::repositories::job_repository::JobRepository;
use scrapeops::infrastructure::artifacts::{feed_file_path, log_file_path};
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn test_transition_follows_state_machine() {
    let app = create_test_app().await;
    let job = create_pending_job(&app, "indeed").await;

    // Pending -> Running
    assert!(app
        .job_repo
        .transition(job.id, &[JobStatus::Pending], JobStatus::Running, None)
        .await
        .unwrap());

    // A second Pending -> Running is a no-op
    assert!(!app
        .job_repo
        .transition(job.id, &[JobStatus::Pending], JobStatus::Running, None)
        .await
        .unwrap());

    // Running -> Finished
    assert!(app
        .job_repo
        .transition(job.id, &[JobStatus::Running], JobStatus::Finished, None)
        .await
        .unwrap());

    // Terminal states accept no further transitions
    assert!(!app
        .job_repo
        .transition(
            job.id,
            &[JobStatus::Pending, JobStatus::Running],
            JobStatus::Canceled,
            None,
        )
        .await
        .unwrap());

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Finished);
    assert!(job.date_finished.is_some());
}

#[tokio::test]
async fn test_canceled_beats_late_finished_report() {
    let app = create_test_app().await;
    let job = create_pending_job(&app, "indeed").await;

    assert!(app
        .job_repo
        .mark_dispatched(job.id, Uuid::new_v4(), Utc::now().into())
        .await
        .unwrap());

    // Operator cancel lands first
    assert!(app
        .job_repo
        .transition(
            job.id,
            &[JobStatus::Pending, JobStatus::Running],
            JobStatus::Canceled,
            None,
        )
        .await
        .unwrap());

    // The worker finishes normally afterwards; its report must not win
    assert!(!app
        .job_repo
        .transition(job.id, &[JobStatus::Running], JobStatus::Finished, None)
        .await
        .unwrap());

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
}

#[tokio::test]
async fn test_mark_dispatched_sets_handle_and_timestamp_once() {
    let app = create_test_app().await;
    let job = create_pending_job(&app, "indeed").await;
    let handle = Uuid::new_v4();

    assert!(app
        .job_repo
        .mark_dispatched(job.id, handle, Utc::now().into())
        .await
        .unwrap());

    let dispatched = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(dispatched.status, JobStatus::Running);
    assert_eq!(dispatched.task_handle, Some(handle));
    assert!(dispatched.date_started.is_some());

    // A redelivered task cannot dispatch the same job twice
    assert!(!app
        .job_repo
        .mark_dispatched(job.id, Uuid::new_v4(), Utc::now().into())
        .await
        .unwrap());
}

#[tokio::test]
async fn test_failure_reason_recorded_on_terminal_failure() {
    let app = create_test_app().await;
    let job = create_pending_job(&app, "indeed").await;

    assert!(app
        .job_repo
        .transition(
            job.id,
            &[JobStatus::Pending],
            JobStatus::Canceled,
            Some("worker launch failed: no such file"),
        )
        .await
        .unwrap());

    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Canceled);
    assert_eq!(
        job.failure_reason.as_deref(),
        Some("worker launch failed: no such file")
    );
}

#[tokio::test]
async fn test_delete_cascades_artifacts_and_is_idempotent() {
    let app = create_test_app().await;
    let log_dir = TempDir::new().unwrap();
    let feeds_dir = TempDir::new().unwrap();

    let job = create_pending_job(&app, "indeed").await;
    app.job_repo
        .mark_dispatched(job.id, Uuid::new_v4(), Utc::now().into())
        .await
        .unwrap();
    let job = app.job_repo.find_by_id(job.id).await.unwrap().unwrap();
    let date_started = job.date_started.unwrap();

    // The external log/feed writer would have produced these
    let log_file = log_file_path(log_dir.path(), "indeed", date_started);
    let feed_file = feed_file_path(feeds_dir.path(), "indeed", date_started);
    std::fs::write(&log_file, "log").unwrap();
    std::fs::write(&feed_file, "[]").unwrap();

    let delete = DeleteJobsUseCase::new(
        app.job_repo.clone(),
        &super::helpers::artifact_settings(log_dir.path(), feeds_dir.path()),
    );

    let deleted = delete
        .execute(DeleteJobsRequestDto {
            all_jobs: false,
            selected_jobs: vec![job.id],
        })
        .await
        .unwrap();

    assert_eq!(deleted, 1);
    assert!(app.job_repo.find_by_id(job.id).await.unwrap().is_none());
    assert!(!log_file.exists());
    assert!(!feed_file.exists());

    // Deleting the same id again (or a made-up one) is a no-op
    let deleted = delete
        .execute(DeleteJobsRequestDto {
            all_jobs: false,
            selected_jobs: vec![job.id, Uuid::new_v4()],
        })
        .await
        .unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_list_by_status_and_terminal() {
    let app = create_test_app().await;

    let pending = create_pending_job(&app, "indeed").await;
    let running = super::helpers::create_running_job(&app, "testspider").await;
    let finished = super::helpers::create_running_job(&app, "testspider2").await;
    app.job_repo
        .transition(finished.id, &[JobStatus::Running], JobStatus::Finished, None)
        .await
        .unwrap();

    let pending_jobs = app.job_repo.list_by_status(JobStatus::Pending).await.unwrap();
    assert_eq!(pending_jobs.len(), 1);
    assert_eq!(pending_jobs[0].id, pending.id);

    let running_jobs = app.job_repo.list_by_status(JobStatus::Running).await.unwrap();
    assert_eq!(running_jobs.len(), 1);
    assert_eq!(running_jobs[0].id, running.id);

    let terminal = app.job_repo.list_terminal().await.unwrap();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].id, finished.id);
}
