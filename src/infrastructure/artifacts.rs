// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::domain::models::job::Job;

/// 产物文件命名：外部日志/输出写入器按
/// `"<spider_name> <开始时间戳>.log"` 与 `".json"` 约定生成文件，
/// 时间戳取秒级精度并将冒号替换为连字符。删除作业时据此
/// 从 spider_name + date_started 推导并移除对应文件。
const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

fn artifact_stem(spider_name: &str, date_started: DateTime<FixedOffset>) -> String {
    format!(
        "{} {}",
        spider_name,
        date_started.format(ARTIFACT_TIMESTAMP_FORMAT)
    )
}

/// 推导作业日志文件路径
pub fn log_file_path(
    log_dir: &Path,
    spider_name: &str,
    date_started: DateTime<FixedOffset>,
) -> PathBuf {
    log_dir.join(format!("{}.log", artifact_stem(spider_name, date_started)))
}

/// 推导作业JSON输出文件路径
pub fn feed_file_path(
    feeds_dir: &Path,
    spider_name: &str,
    date_started: DateTime<FixedOffset>,
) -> PathBuf {
    feeds_dir.join(format!("{}.json", artifact_stem(spider_name, date_started)))
}

/// 删除一个作业的日志与JSON输出文件
///
/// 从未分发过的作业（没有开始时间）没有产物；缺失的文件只记录
/// 警告，不视为错误。
pub fn remove_job_artifacts(log_dir: &Path, feeds_dir: &Path, job: &Job) {
    let Some(date_started) = job.date_started else {
        return;
    };

    for path in [
        log_file_path(log_dir, &job.spider_name, date_started),
        feed_file_path(feeds_dir, &job.spider_name, date_started),
    ] {
        if path.is_file() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed deleting artifact file {}: {}", path.display(), e);
            }
        } else {
            warn!("Can't locate the artifact file {}", path.display());
        }
    }
}

#[cfg(test)]
#[path = "artifacts_test.rs"]
mod tests;
