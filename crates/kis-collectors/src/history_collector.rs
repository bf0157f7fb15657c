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

//! The collection engine: a bounded-parallel driver that consults the
//! freshness oracle, pulls OHLCV from the broker, persists it and maintains
//! the stock's derived fields.
//!
//! Each unit (one stock) runs on its own pooled connection. A failing unit is
//! logged and counted; it never stops the job. Cancellation is cooperative:
//! units observe the flag at their start, the driver polls the Task row every
//! few completions, and in-flight upstream requests run to completion with
//! their outcomes recorded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use kis_analysis::indicators::mean_of_recent;
use kis_client::KisClient;
use kis_core::{ExchangeCode, MIN_HISTORY_RECORDS, Market, Period};
use kis_database_postgres::PgPool;
use kis_database_postgres::models::{
  CollectionLog, NewCollectionLog, NewPriceHistory, PriceHistory, Stock, StockCollectionUpdate,
  Task, TaskProgressUpdate, status,
};

use crate::counters::Counters;
use crate::error::{CollectorError, CollectorResult};
use crate::freshness::{CollectPlan, decide, last_trading_day};
use crate::universe::UniverseSelector;
use crate::validate::validate_bar;

/// Task-row refresh and cancellation-poll cadence, in completed units
pub const PROGRESS_REFRESH_EVERY: usize = 10;

/// Rows feeding the cached 90-day moving average
pub const MA90_WINDOW: usize = 90;

#[derive(Debug, Clone)]
pub struct CollectOptions {
  pub universe: UniverseSelector,
  /// Look-back window for full collection, in calendar days
  pub days: u32,
  /// Worker pool size, clamped to [1, 20]
  pub max_workers: usize,
}

/// Outcome of a collection job
#[derive(Debug, Clone, Copy)]
pub struct CollectionSummary {
  pub total: usize,
  pub counters: Counters,
  pub cancelled: bool,
}

pub struct HistoryCollector {
  pool: PgPool,
  client: Arc<KisClient>,
}

impl HistoryCollector {
  pub fn new(pool: PgPool, client: Arc<KisClient>) -> Self {
    Self { pool, client }
  }

  /// Run a collection job against an existing Task row.
  ///
  /// The driver materializes the universe up front, fans units out to the
  /// bounded worker pool and refreshes the Task row every
  /// [`PROGRESS_REFRESH_EVERY`] completions.
  pub async fn run(
    &self,
    task_id: Uuid,
    options: CollectOptions,
    cancel_flag: Arc<AtomicBool>,
  ) -> CollectorResult<CollectionSummary> {
    let max_workers = options.max_workers.clamp(1, kis_core::MAX_WORKERS);

    let stocks = {
      let mut conn = self.pool.get().await?;
      options.universe.select(&mut conn).await?
    };
    let total = stocks.len();

    info!(
      "Starting collection: {} stocks ({}, {} days, {} workers)",
      total,
      options.universe.label(),
      options.days,
      max_workers
    );

    {
      let mut conn = self.pool.get().await?;
      Task::update_progress(
        &mut conn,
        task_id,
        &TaskProgressUpdate {
          total_items: Some(total as i32),
          message: Some(format!(
            "collecting {} stocks ({} days, {} workers)",
            total, options.days, max_workers
          )),
          ..Default::default()
        },
      )
      .await?;
    }

    let counters = Arc::new(Mutex::new(Counters::default()));
    let semaphore = Arc::new(Semaphore::new(max_workers));

    let unit_pool = self.pool.clone();
    let unit_client = self.client.clone();
    let unit_counters = counters.clone();
    let unit_flag = cancel_flag.clone();
    let days = options.days;

    let mut completions = stream::iter(stocks.into_iter().map(move |stock| {
      let pool = unit_pool.clone();
      let client = unit_client.clone();
      let counters = unit_counters.clone();
      let flag = unit_flag.clone();
      let semaphore = semaphore.clone();

      async move {
        let _permit = semaphore.acquire().await.expect("worker semaphore closed");
        if flag.load(Ordering::Relaxed) {
          debug!("Skipping {}: cancellation requested", stock.symbol);
          return;
        }
        Self::process_unit(pool, client, task_id, stock, days, counters).await;
      }
    }))
    .buffer_unordered(max_workers);

    let mut completed = 0usize;
    while completions.next().await.is_some() {
      completed += 1;

      if completed % PROGRESS_REFRESH_EVERY == 0 || completed == total {
        let snapshot = *counters.lock().await;
        let mut conn = self.pool.get().await?;

        Task::update_progress(
          &mut conn,
          task_id,
          &TaskProgressUpdate {
            current_item: Some(completed as i32),
            success_count: Some(snapshot.success as i32),
            failed_count: Some(snapshot.failed as i32),
            message: Some(snapshot.progress_message(total)),
            ..Default::default()
          },
        )
        .await?;

        if !cancel_flag.load(Ordering::Relaxed) {
          if let Some(current) = Task::status_of(&mut conn, task_id).await? {
            if current == status::CANCELLED {
              info!("Task {} cancelled; remaining units will be skipped", task_id);
              cancel_flag.store(true, Ordering::Relaxed);
            }
          }
        }
      }
    }
    drop(completions);

    let snapshot = *counters.lock().await;
    let cancelled = cancel_flag.load(Ordering::Relaxed);

    let mut conn = self.pool.get().await?;
    Task::update_progress(
      &mut conn,
      task_id,
      &TaskProgressUpdate {
        current_item: Some(snapshot.processed as i32),
        success_count: Some(snapshot.success as i32),
        failed_count: Some(snapshot.failed as i32),
        ..Default::default()
      },
    )
    .await?;

    if cancelled {
      Task::stamp_completed(
        &mut conn,
        task_id,
        Some(&format!("cancelled after {} of {} stocks", snapshot.processed, total)),
      )
      .await?;
    } else {
      Task::finish(
        &mut conn,
        task_id,
        status::COMPLETED,
        Some(&snapshot.summary_message(total)),
        None,
      )
      .await?;
    }

    info!("{}", snapshot.summary_message(total));
    Ok(CollectionSummary { total, counters: snapshot, cancelled })
  }

  /// One stock end to end. Per-unit failures are absorbed into the counters
  /// and the CollectionLog; only infrastructure errors (pool exhaustion,
  /// broken connection) escape.
  async fn process_unit(
    pool: PgPool,
    client: Arc<KisClient>,
    task_id: Uuid,
    stock: Stock,
    days: u32,
    counters: Arc<Mutex<Counters>>,
  ) {
    if let Err(e) = Self::collect_one(&pool, &client, task_id, &stock, days, &counters).await {
      error!("Worker error for {}: {}", stock.symbol, e);
      counters.lock().await.record_failure();
    }
  }

  async fn collect_one(
    pool: &PgPool,
    client: &KisClient,
    task_id: Uuid,
    stock: &Stock,
    days: u32,
    counters: &Mutex<Counters>,
  ) -> CollectorResult<()> {
    let mut conn = pool.get().await?;

    let market = match Market::parse(&stock.market) {
      Some(market) => market,
      None => {
        let log =
          NewCollectionLog::running(task_id, stock.id, &stock.symbol, &stock.name)
            .insert(&mut conn)
            .await?;
        CollectionLog::complete_failed(
          &mut conn,
          log.id,
          &format!("Unknown market: {}", stock.market),
        )
        .await?;
        counters.lock().await.record_failure();
        return Ok(());
      }
    };

    let last_date = if stock.history_records_count >= MIN_HISTORY_RECORDS {
      PriceHistory::latest_date(&mut conn, stock.id).await?
    } else {
      None
    };
    let plan = decide(
      stock.history_records_count,
      last_date,
      last_trading_day(market, Utc::now()),
      MIN_HISTORY_RECORDS,
    );

    if let CollectPlan::Skip { last_date } = plan {
      debug!("Skip {}: already up to date (last: {})", stock.symbol, last_date);
      counters.lock().await.record_skip();
      return Ok(());
    }

    let log = NewCollectionLog::running(task_id, stock.id, &stock.symbol, &stock.name)
      .insert(&mut conn)
      .await?;

    {
      let mut guard = counters.lock().await;
      match plan {
        CollectPlan::Incremental { .. } => guard.incremental += 1,
        CollectPlan::Full => guard.full += 1,
        CollectPlan::Skip { .. } => {}
      }
    }

    match Self::fetch_and_store(&mut conn, client, stock, market, plan, days).await {
      Ok(saved) => {
        CollectionLog::complete_success(&mut conn, log.id, saved).await?;
        counters.lock().await.record_success(saved as u32);
        Ok(())
      }
      Err(e) => {
        warn!("Collection failed for {}: {}", stock.symbol, e);
        CollectionLog::complete_failed(&mut conn, log.id, &e.to_string()).await?;
        counters.lock().await.record_failure();
        Ok(())
      }
    }
  }

  async fn fetch_and_store(
    conn: &mut diesel_async::AsyncPgConnection,
    client: &KisClient,
    stock: &Stock,
    market: Market,
    plan: CollectPlan,
    days: u32,
  ) -> CollectorResult<i32> {
    let today = Utc::now().date_naive();
    let start = match plan {
      CollectPlan::Incremental { start, .. } => start,
      _ => today - Duration::days(days as i64),
    };

    debug!(
      "Collecting {} [{}: {} ~ {}]",
      stock.symbol,
      plan.mode_label(),
      start,
      today
    );

    let bars = match market {
      Market::Kr => client.get_kr_ohlcv(&stock.symbol, start, today, Period::Day).await?,
      Market::Us => {
        let exchange =
          ExchangeCode::from_exchange_name(stock.exchange.as_deref().unwrap_or(""));
        let fetched = client.get_us_ohlcv(&stock.symbol, exchange, Period::Day).await?;
        // The overseas endpoint takes no date range; trim client-side
        fetched.into_iter().filter(|b| b.date >= start).collect()
      }
    };

    if bars.is_empty() {
      return Err(CollectorError::ApiError("No data received from API".to_string()));
    }

    let now = Utc::now();
    let mut saved = 0i32;
    for bar in &bars {
      if let Err(reason) = validate_bar(bar) {
        warn!("Dropping {} {} bar: {}", stock.symbol, bar.date, reason);
        continue;
      }

      let row = NewPriceHistory {
        stock_id: stock.id,
        date: bar.date,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: bar.volume,
        created_at: now,
        updated_at: now,
      };
      row.upsert(conn).await?;
      saved += 1;
    }

    let total_records = PriceHistory::count_for_stock(conn, stock.id).await?;

    let ma90 = if total_records >= MIN_HISTORY_RECORDS as i64 {
      let closes = PriceHistory::recent_closes(conn, stock.id, MA90_WINDOW as i64).await?;
      mean_of_recent(&closes, MA90_WINDOW)
    } else {
      None
    };

    // Quote refresh is best-effort; a failed quote never fails the unit
    let current_price = match market {
      Market::Kr => client.get_kr_price(&stock.symbol).await.unwrap_or(None),
      Market::Us => {
        let exchange =
          ExchangeCode::from_exchange_name(stock.exchange.as_deref().unwrap_or(""));
        client.get_us_price(&stock.symbol, exchange).await.unwrap_or(None)
      }
    };

    let update = StockCollectionUpdate {
      history_records_count: total_records as i32,
      ma90_price: ma90,
      current_price,
      history_updated_at: now,
      updated_at: now,
    };
    Stock::update_after_collection(conn, stock.id, &update).await?;

    info!("Saved {} records for {} (total: {})", saved, stock.symbol, total_records);
    Ok(saved)
  }
}
