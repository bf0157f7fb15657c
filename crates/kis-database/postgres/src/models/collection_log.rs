/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-dot-]browne[-at-]dwightjbrowne[-dot-]com
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

//! Per-stock outcome rows written by the collection engine.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::collection_logs;

pub mod log_status {
  pub const RUNNING: &str = "running";
  pub const SUCCESS: &str = "success";
  pub const FAILED: &str = "failed";
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = collection_logs)]
pub struct CollectionLog {
  pub id: i64,
  pub task_id: Uuid,
  pub stock_id: i32,
  pub stock_symbol: String,
  pub stock_name: String,
  pub status: String,
  pub records_saved: i32,
  pub error_message: Option<String>,
  pub started_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = collection_logs)]
pub struct NewCollectionLog<'a> {
  pub task_id: Uuid,
  pub stock_id: i32,
  pub stock_symbol: &'a str,
  pub stock_name: &'a str,
  pub status: &'a str,
  pub records_saved: i32,
  pub started_at: DateTime<Utc>,
}

impl<'a> NewCollectionLog<'a> {
  pub fn running(task_id: Uuid, stock_id: i32, symbol: &'a str, name: &'a str) -> Self {
    Self {
      task_id,
      stock_id,
      stock_symbol: symbol,
      stock_name: name,
      status: log_status::RUNNING,
      records_saved: 0,
      started_at: Utc::now(),
    }
  }

  pub async fn insert(
    &self,
    conn: &mut AsyncPgConnection,
  ) -> Result<CollectionLog, diesel::result::Error> {
    diesel::insert_into(collection_logs::table).values(self).get_result(conn).await
  }
}

impl CollectionLog {
  pub async fn complete_success(
    conn: &mut AsyncPgConnection,
    log_id: i64,
    records_saved: i32,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(collection_logs::table.find(log_id))
      .set((
        collection_logs::status.eq(log_status::SUCCESS),
        collection_logs::records_saved.eq(records_saved),
        collection_logs::completed_at.eq(Utc::now()),
      ))
      .execute(conn)
      .await
  }

  pub async fn complete_failed(
    conn: &mut AsyncPgConnection,
    log_id: i64,
    error_message: &str,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(collection_logs::table.find(log_id))
      .set((
        collection_logs::status.eq(log_status::FAILED),
        collection_logs::error_message.eq(error_message),
        collection_logs::completed_at.eq(Utc::now()),
      ))
      .execute(conn)
      .await
  }

  /// Stock ids that failed in a prior run; seeds the retry-failed universe
  pub async fn failed_stock_ids(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
  ) -> Result<Vec<i32>, diesel::result::Error> {
    collection_logs::table
      .filter(collection_logs::task_id.eq(task_id))
      .filter(collection_logs::status.eq(log_status::FAILED))
      .select(collection_logs::stock_id)
      .distinct()
      .load(conn)
      .await
  }

  pub async fn for_task(
    conn: &mut AsyncPgConnection,
    task_id: Uuid,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    collection_logs::table
      .filter(collection_logs::task_id.eq(task_id))
      .order(collection_logs::started_at.asc())
      .load(conn)
      .await
  }
}
