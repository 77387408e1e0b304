// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod handlers;
pub mod routes;

use crate::application::usecases::cancel_job::CancelJobUseCase;
use crate::application::usecases::delete_jobs::DeleteJobsUseCase;
use crate::application::usecases::periodic_control::PeriodicControlUseCase;
use crate::application::usecases::submit_jobs::SubmitJobsUseCase;
use crate::infrastructure::repositories::job_repo_impl::JobRepositoryImpl;
use crate::infrastructure::repositories::periodic_job_repo_impl::PeriodicJobRepositoryImpl;
use crate::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use crate::queue::periodic_scheduler::PeriodicScheduler;
use crate::queue::task_queue::PostgresTaskQueue;

/// 控制面装配出的具体类型别名，处理器签名统一引用这里
pub type AppTaskQueue = PostgresTaskQueue<TaskRepositoryImpl>;
pub type AppScheduler =
    PeriodicScheduler<JobRepositoryImpl, PeriodicJobRepositoryImpl, AppTaskQueue>;
pub type AppSubmitJobs = SubmitJobsUseCase<JobRepositoryImpl, AppTaskQueue>;
pub type AppCancelJob = CancelJobUseCase<JobRepositoryImpl>;
pub type AppDeleteJobs = DeleteJobsUseCase<JobRepositoryImpl>;
pub type AppPeriodicControl =
    PeriodicControlUseCase<JobRepositoryImpl, PeriodicJobRepositoryImpl, AppTaskQueue>;
