/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! The generic substrate for long-running jobs: launches drivers onto the
//! runtime, persists Task rows, and serves cancel / restart / retry-failed.
//!
//! Cancellation is two-channel: the Task row transition is visible to every
//! process, and an in-process atomic flag short-circuits workers without
//! waiting for their next row poll. Jobs abort themselves after 59 minutes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use kis_client::KisClient;
use kis_core::{Config, SOFT_TIME_LIMIT_SECS};
use kis_database_postgres::PgPool;
use kis_database_postgres::models::{CollectionLog, NewTask, Task, status, task_type};

use crate::error::{CollectorError, CollectorResult};
use crate::history_collector::{CollectOptions, HistoryCollector};
use crate::signal_runner::{AnalysisKind, AnalyzeOptions, SignalRunner};
use crate::universe::UniverseSelector;

/// What a launched job does
#[derive(Debug, Clone)]
pub enum JobSpec {
  Collection(CollectOptions),
  TrendlineAnalysis(AnalyzeOptions),
  MaAnalysis(AnalyzeOptions),
}

impl JobSpec {
  pub fn task_type(&self) -> &'static str {
    match self {
      JobSpec::Collection(_) => task_type::HISTORY_COLLECTION,
      JobSpec::TrendlineAnalysis(_) => task_type::SIGNAL_ANALYSIS,
      JobSpec::MaAnalysis(_) => task_type::MA_SIGNAL_ANALYSIS,
    }
  }
}

struct JobHandle {
  cancel_flag: Arc<AtomicBool>,
}

/// Owns the worker pool and the in-process registry of running jobs
pub struct TaskRunner {
  pool: PgPool,
  client: Arc<KisClient>,
  config: Config,
  jobs: Arc<Mutex<HashMap<Uuid, JobHandle>>>,
}

impl TaskRunner {
  pub fn new(pool: PgPool, client: Arc<KisClient>, config: Config) -> Self {
    Self { pool, client, config, jobs: Arc::new(Mutex::new(HashMap::new())) }
  }

  /// Create the Task row, submit the driver, return immediately
  pub async fn launch(&self, spec: JobSpec) -> CollectorResult<Uuid> {
    let task_id = Uuid::new_v4();

    {
      let mut conn = self.pool.get().await?;
      NewTask::running(task_id, spec.task_type(), Some("queued")).insert(&mut conn).await?;
    }

    let cancel_flag = Arc::new(AtomicBool::new(false));
    self
      .jobs
      .lock()
      .await
      .insert(task_id, JobHandle { cancel_flag: cancel_flag.clone() });

    let pool = self.pool.clone();
    let client = self.client.clone();
    let jobs = self.jobs.clone();

    info!("Launching {} task {}", spec.task_type(), task_id);

    tokio::spawn(async move {
      let outcome = timeout(
        Duration::from_secs(SOFT_TIME_LIMIT_SECS),
        drive(pool.clone(), client, spec, task_id, cancel_flag),
      )
      .await;

      match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
          error!("Task {} failed: {}", task_id, e);
          mark_failed(&pool, task_id, &e.to_string()).await;
        }
        Err(_elapsed) => {
          warn!("Task {} hit the soft time limit", task_id);
          mark_failed(&pool, task_id, &CollectorError::TimeLimit.to_string()).await;
        }
      }

      jobs.lock().await.remove(&task_id);
    });

    Ok(task_id)
  }

  pub async fn get(&self, task_id: Uuid) -> CollectorResult<Task> {
    let mut conn = self.pool.get().await?;
    Task::find_by_task_id(&mut conn, task_id)
      .await?
      .ok_or(CollectorError::TaskNotFound(task_id))
  }

  pub async fn list_running(&self) -> CollectorResult<Vec<Task>> {
    let mut conn = self.pool.get().await?;
    Ok(Task::list_running(&mut conn).await?)
  }

  /// Best-effort cooperative cancel. Returns `true` when a running task
  /// transitioned; workers observe the flip on their next poll.
  pub async fn cancel(&self, task_id: Uuid) -> CollectorResult<bool> {
    let flipped = {
      let mut conn = self.pool.get().await?;
      Task::request_cancel(&mut conn, task_id).await?
    };

    if let Some(job) = self.jobs.lock().await.get(&task_id) {
      job.cancel_flag.store(true, Ordering::Relaxed);
    }

    if flipped {
      info!("Cancellation requested for task {}", task_id);
    }
    Ok(flipped)
  }

  /// Re-launch a finished task's type with the configured defaults
  pub async fn restart(&self, task_id: Uuid) -> CollectorResult<Uuid> {
    let original = self.get(task_id).await?;

    let spec = match original.task_type.as_str() {
      task_type::HISTORY_COLLECTION => JobSpec::Collection(self.default_collect_options()),
      task_type::SIGNAL_ANALYSIS => JobSpec::TrendlineAnalysis(AnalyzeOptions {
        universe: UniverseSelector::AllActive,
        days: AnalysisKind::Trendline.default_days(),
        force_full: false,
      }),
      task_type::MA_SIGNAL_ANALYSIS => JobSpec::MaAnalysis(AnalyzeOptions {
        universe: UniverseSelector::AllActive,
        days: AnalysisKind::MovingAverage.default_days(),
        force_full: false,
      }),
      other => {
        return Err(CollectorError::InvalidData(format!("Unknown task type: {}", other)));
      }
    };

    self.launch(spec).await
  }

  /// Launch a new collection restricted to the stocks that failed in a prior
  /// run. The new Task's universe is exactly the failed set.
  pub async fn retry_failed(&self, task_id: Uuid, days: u32) -> CollectorResult<Uuid> {
    let failed_ids = {
      let mut conn = self.pool.get().await?;
      CollectionLog::failed_stock_ids(&mut conn, task_id).await?
    };

    if failed_ids.is_empty() {
      return Err(CollectorError::InvalidData(format!(
        "Task {} has no failed stocks to retry",
        task_id
      )));
    }

    info!("Retrying {} failed stocks from task {}", failed_ids.len(), task_id);

    self
      .launch(JobSpec::Collection(CollectOptions {
        universe: UniverseSelector::Ids(failed_ids),
        days,
        max_workers: self.config.history_collection_workers,
      }))
      .await
  }

  /// Startup reconciliation of Task rows orphaned by a crash
  pub async fn sweep_stale(&self) -> CollectorResult<usize> {
    let mut conn = self.pool.get().await?;
    let swept = Task::fail_stale_running(&mut conn, SOFT_TIME_LIMIT_SECS as i64).await?;
    if swept > 0 {
      warn!("Marked {} stale running tasks as failed", swept);
    }
    Ok(swept)
  }

  fn default_collect_options(&self) -> CollectOptions {
    CollectOptions {
      universe: UniverseSelector::from_mode(
        self.config.history_collection_mode,
        self.config.history_collection_limit,
      ),
      days: self.config.history_collection_days,
      max_workers: self.config.history_collection_workers,
    }
  }
}

async fn drive(
  pool: PgPool,
  client: Arc<KisClient>,
  spec: JobSpec,
  task_id: Uuid,
  cancel_flag: Arc<AtomicBool>,
) -> CollectorResult<()> {
  match spec {
    JobSpec::Collection(options) => {
      HistoryCollector::new(pool, client).run(task_id, options, cancel_flag).await?;
    }
    JobSpec::TrendlineAnalysis(options) => {
      SignalRunner::new(pool).run_trendline(task_id, options, cancel_flag).await?;
    }
    JobSpec::MaAnalysis(options) => {
      SignalRunner::new(pool).run_moving_average(task_id, options, cancel_flag).await?;
    }
  }
  Ok(())
}

async fn mark_failed(pool: &PgPool, task_id: Uuid, error_message: &str) {
  match pool.get().await {
    Ok(mut conn) => {
      if let Err(e) =
        Task::finish(&mut conn, task_id, status::FAILED, None, Some(error_message)).await
      {
        error!("Failed to record task {} failure: {}", task_id, e);
      }
    }
    Err(e) => error!("Failed to record task {} failure: {}", task_id, e),
  }
}
