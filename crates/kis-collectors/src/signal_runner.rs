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

//! The batch signal analyzer: runs a strategy family over every stock in the
//! delta-filtered universe and materializes deduplicated signal rows.
//!
//! Unresolved approaching-breakout signals are confirmed or refuted BEFORE a
//! stock's signals are recomputed, so the stored history of near-misses vs
//! hits is preserved across runs. Progress flows through the Task row
//! (`current_item` / `current_stock_name`); analysis writes no per-item log
//! rows.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Utc};
use diesel_async::AsyncPgConnection;
use tracing::{error, info};
use uuid::Uuid;

use kis_analysis::{
  ApproachingDetails, Bar, MovingAverageStrategy, Series, SignalEmission, Strategy,
  StrategyFamily, TrendlineBreakoutStrategy, confirm_approaching, names,
};
use kis_core::{MIN_HISTORY_RECORDS, MIN_MA_HISTORY_RECORDS};
use kis_database_postgres::PgPool;
use kis_database_postgres::models::{
  NewSignal, PriceHistory, Signal, Stock, Task, TaskProgressUpdate, status,
};

use crate::error::{CollectorError, CollectorResult};
use crate::universe::UniverseSelector;

/// Bars walked forward when resolving an approaching signal
pub const CONFIRMATION_WINDOW: usize = 3;

/// Look-back window for unresolved approaching signals, in days
pub const CONFIRMATION_LOOKBACK_DAYS: i64 = 10;

/// Which strategy family a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
  Trendline,
  MovingAverage,
}

impl AnalysisKind {
  /// History depth below which a stock is discarded from the universe
  pub fn min_records(&self) -> i32 {
    match self {
      AnalysisKind::Trendline => MIN_HISTORY_RECORDS,
      AnalysisKind::MovingAverage => MIN_MA_HISTORY_RECORDS,
    }
  }

  /// Default look-back window in calendar days
  pub fn default_days(&self) -> u32 {
    match self {
      AnalysisKind::Trendline => 120,
      AnalysisKind::MovingAverage => 250,
    }
  }
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
  pub universe: UniverseSelector,
  pub days: u32,
  /// Skip the delta filter and re-scan the full universe
  pub force_full: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisSummary {
  pub total: usize,
  pub analyzed: u32,
  pub failed: u32,
  pub stocks_with_signals: u32,
  pub signals_found: u32,
  pub signals_saved: u32,
  pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct StockOutcome {
  found: u32,
  saved: u32,
}

/// Percent return from signal price to current price, rounded to 2 decimals
pub fn return_percent(current_price: Option<f64>, signal_price: f64) -> Option<f64> {
  match current_price {
    Some(current) if signal_price > 0.0 => {
      Some(((current - signal_price) / signal_price * 100.0 * 100.0).round() / 100.0)
    }
    _ => None,
  }
}

pub struct SignalRunner {
  pool: PgPool,
}

impl SignalRunner {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn run_trendline(
    &self,
    task_id: Uuid,
    options: AnalyzeOptions,
    cancel_flag: Arc<AtomicBool>,
  ) -> CollectorResult<AnalysisSummary> {
    self.run(task_id, options, cancel_flag, AnalysisKind::Trendline).await
  }

  pub async fn run_moving_average(
    &self,
    task_id: Uuid,
    options: AnalyzeOptions,
    cancel_flag: Arc<AtomicBool>,
  ) -> CollectorResult<AnalysisSummary> {
    self.run(task_id, options, cancel_flag, AnalysisKind::MovingAverage).await
  }

  async fn run(
    &self,
    task_id: Uuid,
    options: AnalyzeOptions,
    cancel_flag: Arc<AtomicBool>,
    kind: AnalysisKind,
  ) -> CollectorResult<AnalysisSummary> {
    let mut conn = self.pool.get().await?;
    let min_records = kind.min_records();

    let stocks = options.universe.select(&mut conn).await?;
    let with_history: HashSet<i32> =
      Stock::ids_with_min_history(&mut conn, min_records as i64).await?.into_iter().collect();

    let mut ids: Vec<i32> =
      stocks.iter().map(|s| s.id).filter(|id| with_history.contains(id)).collect();

    info!(
      "Universe {}: {} stocks, {} with {}+ history rows",
      options.universe.label(),
      stocks.len(),
      ids.len(),
      min_records
    );

    if !options.force_full {
      ids = Stock::delta_filter(&mut conn, &ids).await?;
      info!("Delta filter: {} stocks need re-analysis", ids.len());
    }

    let total = ids.len();
    Task::update_progress(
      &mut conn,
      task_id,
      &TaskProgressUpdate {
        total_items: Some(total as i32),
        message: Some(format!(
          "signal analysis started ({}, {} stocks)",
          options.universe.label(),
          total
        )),
        ..Default::default()
      },
    )
    .await?;

    let mut summary = AnalysisSummary { total, ..Default::default() };

    for (idx, stock_id) in ids.iter().enumerate() {
      if cancel_flag.load(Ordering::Relaxed) {
        summary.cancelled = true;
        break;
      }
      if let Some(current) = Task::status_of(&mut conn, task_id).await? {
        if current == status::CANCELLED {
          info!("Task {} cancelled by user", task_id);
          cancel_flag.store(true, Ordering::Relaxed);
          summary.cancelled = true;
          break;
        }
      }

      let Some(stock) = Stock::find(&mut conn, *stock_id).await? else {
        continue;
      };

      Task::update_progress(
        &mut conn,
        task_id,
        &TaskProgressUpdate {
          current_item: Some((idx + 1) as i32),
          current_stock_name: Some(stock.name.clone()),
          message: Some(format!("analyzing {}/{}: {}", idx + 1, total, stock.name)),
          ..Default::default()
        },
      )
      .await?;

      match self.analyze_stock(&mut conn, &stock, options.days, kind).await {
        Ok(outcome) => {
          summary.analyzed += 1;
          if outcome.found > 0 {
            summary.stocks_with_signals += 1;
            summary.signals_found += outcome.found;
            summary.signals_saved += outcome.saved;
          }
        }
        Err(e) => {
          error!("Error analyzing stock {}: {}", stock.symbol, e);
          summary.failed += 1;
        }
      }
    }

    Task::update_progress(
      &mut conn,
      task_id,
      &TaskProgressUpdate {
        current_item: Some((summary.analyzed + summary.failed) as i32),
        success_count: Some(summary.analyzed as i32),
        failed_count: Some(summary.failed as i32),
        ..Default::default()
      },
    )
    .await?;

    let message = format!(
      "analysis complete: {}/{} stocks with signals, {} signals saved",
      summary.stocks_with_signals, total, summary.signals_saved
    );

    if summary.cancelled {
      Task::stamp_completed(&mut conn, task_id, Some(&message)).await?;
    } else {
      Task::finish(&mut conn, task_id, status::COMPLETED, Some(&message), None).await?;
    }

    info!("{}", message);
    Ok(summary)
  }

  async fn analyze_stock(
    &self,
    conn: &mut AsyncPgConnection,
    stock: &Stock,
    days: u32,
    kind: AnalysisKind,
  ) -> CollectorResult<StockOutcome> {
    let today = Utc::now().date_naive();
    let from = today - Duration::days(days as i64);

    let rows = PriceHistory::load_since(conn, stock.id, from).await?;
    if rows.len() < kind.min_records() as usize {
      Stock::mark_signal_analyzed(conn, stock.id, Utc::now()).await?;
      return Ok(StockOutcome::default());
    }

    let bars: Vec<Bar> = rows
      .iter()
      .map(|r| Bar {
        date: r.date,
        open: r.open,
        high: r.high,
        low: r.low,
        close: r.close,
        volume: r.volume,
      })
      .collect();
    let series = Series::new(bars).map_err(|e| CollectorError::InvalidData(e.to_string()))?;

    let outcome = match kind {
      AnalysisKind::Trendline => {
        self.resolve_approaching_signals(conn, stock, &series).await?;

        let emissions = TrendlineBreakoutStrategy::default().analyze(&series);
        let saved = self.persist_emissions(conn, stock, &emissions).await?;
        StockOutcome { found: emissions.len() as u32, saved }
      }
      AnalysisKind::MovingAverage => {
        // The MA family is replaced wholesale on each re-analysis
        Signal::delete_for_strategies(
          conn,
          stock.id,
          StrategyFamily::MovingAverage.strategy_names(),
        )
        .await?;

        let emissions = MovingAverageStrategy::default().analyze(&series);
        let saved = self.persist_emissions(conn, stock, &emissions).await?;
        StockOutcome { found: emissions.len() as u32, saved }
      }
    };

    Stock::mark_signal_analyzed(conn, stock.id, Utc::now()).await?;
    Ok(outcome)
  }

  /// Walk unresolved approaching-breakout signals from the last ten days
  /// forward and persist whether the trendline actually broke.
  async fn resolve_approaching_signals(
    &self,
    conn: &mut AsyncPgConnection,
    stock: &Stock,
    series: &Series,
  ) -> CollectorResult<()> {
    let since = Utc::now().date_naive() - Duration::days(CONFIRMATION_LOOKBACK_DAYS);
    let signals =
      Signal::for_strategy_since(conn, stock.id, names::APPROACHING_BREAKOUT, since).await?;

    for signal in signals {
      let Some(details_value) = signal.details else { continue };
      let Ok(mut details) = serde_json::from_value::<ApproachingDetails>(details_value) else {
        continue;
      };
      if details.breakout_confirmed.is_some() {
        continue;
      }

      let bars_after = series.bars_after(signal.signal_date);
      let Some(outcome) = confirm_approaching(
        details.trendline_slope,
        details.trendline_intercept,
        details.bar_index,
        bars_after,
        CONFIRMATION_WINDOW,
      ) else {
        continue;
      };

      details.breakout_confirmed = Some(outcome.confirmed);
      details.breakout_date = outcome.breakout_date;
      let value = serde_json::to_value(&details)?;
      Signal::update_details(conn, signal.id, &value, Utc::now()).await?;

      info!(
        "Approaching signal for {} on {} resolved: {}",
        stock.symbol,
        signal.signal_date,
        if outcome.confirmed { "breakout" } else { "no breakout" }
      );
    }

    Ok(())
  }

  async fn persist_emissions(
    &self,
    conn: &mut AsyncPgConnection,
    stock: &Stock,
    emissions: &[SignalEmission],
  ) -> CollectorResult<u32> {
    let now = Utc::now();
    let mut saved = 0u32;

    for emission in emissions {
      let new_signal = NewSignal {
        stock_id: stock.id,
        signal_date: emission.date,
        strategy_name: emission.strategy_name.to_string(),
        signal_type: emission.kind.as_str().to_string(),
        signal_price: emission.price,
        current_price: stock.current_price,
        return_percent: return_percent(stock.current_price, emission.price),
        details: Some(emission.details.clone()),
        is_active: true,
        analyzed_at: now,
        updated_at: now,
      };

      if new_signal.upsert(conn).await? {
        saved += 1;
      }
    }

    Ok(saved)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_return_percent_rounding() {
    assert_eq!(return_percent(Some(110.0), 100.0), Some(10.0));
    assert_eq!(return_percent(Some(100.0), 98.0), Some(2.04));
    assert_eq!(return_percent(Some(90.0), 100.0), Some(-10.0));
  }

  #[test]
  fn test_return_percent_missing_inputs() {
    assert_eq!(return_percent(None, 100.0), None);
    assert_eq!(return_percent(Some(100.0), 0.0), None);
  }

  #[test]
  fn test_analysis_kind_thresholds() {
    assert_eq!(AnalysisKind::Trendline.min_records(), 60);
    assert_eq!(AnalysisKind::MovingAverage.min_records(), 200);
    assert_eq!(AnalysisKind::Trendline.default_days(), 120);
    assert_eq!(AnalysisKind::MovingAverage.default_days(), 250);
  }
}
