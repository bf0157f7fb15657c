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

//! Materialized buy/sell signal rows.
//!
//! `(stock_id, signal_date, strategy_name)` is unique. Re-emitting an existing
//! signal refreshes only the mark-to-market fields; the original signal price
//! and details are preserved.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use crate::schema::signals;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = signals)]
pub struct Signal {
  pub id: i64,
  pub stock_id: i32,
  pub signal_date: NaiveDate,
  pub strategy_name: String,
  pub signal_type: String,
  pub signal_price: f64,
  pub current_price: Option<f64>,
  pub return_percent: Option<f64>,
  pub details: Option<serde_json::Value>,
  pub is_active: bool,
  pub analyzed_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = signals)]
pub struct NewSignal {
  pub stock_id: i32,
  pub signal_date: NaiveDate,
  pub strategy_name: String,
  pub signal_type: String,
  pub signal_price: f64,
  pub current_price: Option<f64>,
  pub return_percent: Option<f64>,
  pub details: Option<serde_json::Value>,
  pub is_active: bool,
  pub analyzed_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl NewSignal {
  /// Insert the signal, or refresh `current_price` / `return_percent` /
  /// `updated_at` when the `(stock_id, signal_date, strategy_name)` key
  /// already exists. Returns `true` when a new row was inserted.
  pub async fn upsert(
    &self,
    conn: &mut AsyncPgConnection,
  ) -> Result<bool, diesel::result::Error> {
    let (analyzed_at, updated_at): (DateTime<Utc>, DateTime<Utc>) =
      diesel::insert_into(signals::table)
        .values(self)
        .on_conflict((signals::stock_id, signals::signal_date, signals::strategy_name))
        .do_update()
        .set((
          signals::current_price.eq(self.current_price),
          signals::return_percent.eq(self.return_percent),
          signals::updated_at.eq(self.updated_at),
        ))
        .returning((signals::analyzed_at, signals::updated_at))
        .get_result(conn)
        .await?;

    // Conflict updates never touch analyzed_at, so the two stamps only match
    // on a fresh insert.
    Ok(analyzed_at == updated_at)
  }
}

impl Signal {
  /// Delete a stock's signals for the given strategy names (re-analysis)
  pub async fn delete_for_strategies(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
    strategy_names: &[&str],
  ) -> Result<usize, diesel::result::Error> {
    diesel::delete(
      signals::table
        .filter(signals::stock_id.eq(stock_id))
        .filter(signals::strategy_name.eq_any(strategy_names.iter().copied())),
    )
    .execute(conn)
    .await
  }

  /// A stock's signals for one strategy since `since`, oldest first
  pub async fn for_strategy_since(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
    strategy_name: &str,
    since: NaiveDate,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    signals::table
      .filter(signals::stock_id.eq(stock_id))
      .filter(signals::strategy_name.eq(strategy_name))
      .filter(signals::signal_date.ge(since))
      .order(signals::signal_date.asc())
      .load(conn)
      .await
  }

  /// Replace the structured details blob (approaching-signal confirmation)
  pub async fn update_details(
    conn: &mut AsyncPgConnection,
    signal_id: i64,
    details: &serde_json::Value,
    now: DateTime<Utc>,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(signals::table.find(signal_id))
      .set((signals::details.eq(details), signals::updated_at.eq(now)))
      .execute(conn)
      .await
  }

  /// Most recent active signals, optionally narrowed to one signal type
  pub async fn active(
    conn: &mut AsyncPgConnection,
    signal_type: Option<&str>,
    limit: i64,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    let mut query = signals::table.filter(signals::is_active.eq(true)).into_boxed();

    if let Some(kind) = signal_type {
      query = query.filter(signals::signal_type.eq(kind.to_string()));
    }

    query.order(signals::signal_date.desc()).limit(limit).load(conn).await
  }
}
