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

//! Task rows persisting long-running job progress.
//!
//! The Task row is the serialization point visible to other processes: one
//! writer (the driver) updates progress, and a cancel request flips the
//! status for workers to observe on their next poll.

use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::tasks;

pub mod status {
  pub const RUNNING: &str = "running";
  pub const COMPLETED: &str = "completed";
  pub const FAILED: &str = "failed";
  pub const CANCELLED: &str = "cancelled";
}

pub mod task_type {
  pub const HISTORY_COLLECTION: &str = "history_collection";
  pub const SIGNAL_ANALYSIS: &str = "signal_analysis";
  pub const MA_SIGNAL_ANALYSIS: &str = "ma_signal_analysis";
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = tasks)]
pub struct Task {
  pub id: i32,
  pub task_id: Uuid,
  pub task_type: String,
  pub status: String,
  pub total_items: i32,
  pub current_item: i32,
  pub current_stock_name: Option<String>,
  pub success_count: i32,
  pub failed_count: i32,
  pub message: Option<String>,
  pub error_message: Option<String>,
  pub started_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tasks)]
pub struct NewTask<'a> {
  pub task_id: Uuid,
  pub task_type: &'a str,
  pub status: &'a str,
  pub total_items: i32,
  pub current_item: i32,
  pub success_count: i32,
  pub failed_count: i32,
  pub message: Option<&'a str>,
  pub started_at: DateTime<Utc>,
}

/// Progress fields refreshed by the driver; `None` leaves a column untouched
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = tasks)]
pub struct TaskProgressUpdate {
  pub total_items: Option<i32>,
  pub current_item: Option<i32>,
  pub current_stock_name: Option<String>,
  pub success_count: Option<i32>,
  pub failed_count: Option<i32>,
  pub message: Option<String>,
}

impl<'a> NewTask<'a> {
  pub fn running(task_id: Uuid, task_type: &'a str, message: Option<&'a str>) -> Self {
    Self {
      task_id,
      task_type,
      status: status::RUNNING,
      total_items: 0,
      current_item: 0,
      success_count: 0,
      failed_count: 0,
      message,
      started_at: Utc::now(),
    }
  }

  pub async fn insert(
    &self,
    conn: &mut AsyncPgConnection,
  ) -> Result<Task, diesel::result::Error> {
    diesel::insert_into(tasks::table).values(self).get_result(conn).await
  }
}

impl Task {
  pub async fn find_by_task_id(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
  ) -> Result<Option<Self>, diesel::result::Error> {
    tasks::table.filter(tasks::task_id.eq(task_id)).first(conn).await.optional()
  }

  pub async fn list_running(
    conn: &mut AsyncPgConnection,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    tasks::table
      .filter(tasks::status.eq(status::RUNNING))
      .order(tasks::started_at.desc())
      .load(conn)
      .await
  }

  /// Cheap status poll for cooperative cancellation
  pub async fn status_of(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
  ) -> Result<Option<String>, diesel::result::Error> {
    tasks::table
      .filter(tasks::task_id.eq(task_id))
      .select(tasks::status)
      .first(conn)
      .await
      .optional()
  }

  pub async fn update_progress(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
    update: &TaskProgressUpdate,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(tasks::table.filter(tasks::task_id.eq(task_id)))
      .set(update)
      .execute(conn)
      .await
  }

  /// Terminal transition. A cancelled task keeps its `cancelled` status; the
  /// finishing driver only fills in counters and the completion time.
  pub async fn finish(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
    final_status: &str,
    message: Option<&str>,
    error_message: Option<&str>,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(
      tasks::table
        .filter(tasks::task_id.eq(task_id))
        .filter(tasks::status.eq(status::RUNNING)),
    )
    .set((
      tasks::status.eq(final_status),
      tasks::message.eq(message),
      tasks::error_message.eq(error_message),
      tasks::completed_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await
  }

  /// Stamp the completion time without touching status (cancelled finalize)
  pub async fn stamp_completed(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
    message: Option<&str>,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(tasks::table.filter(tasks::task_id.eq(task_id)))
      .set((tasks::message.eq(message), tasks::completed_at.eq(Utc::now())))
      .execute(conn)
      .await
  }

  /// Best-effort cancel: only a running task can transition to cancelled.
  /// Returns `true` when the transition happened.
  pub async fn request_cancel(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
  ) -> Result<bool, diesel::result::Error> {
    let rows = diesel::update(
      tasks::table
        .filter(tasks::task_id.eq(task_id))
        .filter(tasks::status.eq(status::RUNNING)),
    )
    .set(tasks::status.eq(status::CANCELLED))
    .execute(conn)
    .await?;
    Ok(rows > 0)
  }

  /// Startup sweep: a crash mid-job leaves `running` rows behind. Anything
  /// older than the soft time limit cannot still be alive.
  pub async fn fail_stale_running(
    conn: &mut AsyncPgConnection,
    older_than_secs: i64,
  ) -> Result<usize, diesel::result::Error> {
    let cutoff = Utc::now() - Duration::seconds(older_than_secs);

    diesel::update(
      tasks::table
        .filter(tasks::status.eq(status::RUNNING))
        .filter(tasks::started_at.lt(cutoff)),
    )
    .set((
      tasks::status.eq(status::FAILED),
      tasks::error_message.eq("stale running task reconciled at startup"),
      tasks::completed_at.eq(Utc::now()),
    ))
    .execute(conn)
    .await
  }
}
