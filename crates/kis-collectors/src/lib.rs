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

//! # kis-collectors
//!
//! The engine room of the KIS market-data system:
//!
//! - a freshness oracle deciding skip / incremental / full per stock
//! - a bounded-parallel collection engine persisting OHLCV histories
//! - batch signal analyzers for the trendline and moving-average families
//! - a task runner with persisted progress, cooperative cancellation,
//!   restart and retry-failed
//!
//! Drivers fetch data through `kis-client`, persist through
//! `kis-database-postgres`, and compute through the pure `kis-analysis` crate.

pub mod counters;
pub mod error;
pub mod freshness;
pub mod history_collector;
pub mod signal_runner;
pub mod task_runner;
pub mod token_store;
pub mod universe;
pub mod validate;

pub use counters::Counters;
pub use error::{CollectorError, CollectorResult};
pub use freshness::{CollectPlan, decide, last_trading_day};
pub use history_collector::{
  CollectOptions, CollectionSummary, HistoryCollector, MA90_WINDOW, PROGRESS_REFRESH_EVERY,
};
pub use signal_runner::{
  AnalysisKind, AnalysisSummary, AnalyzeOptions, CONFIRMATION_LOOKBACK_DAYS, CONFIRMATION_WINDOW,
  SignalRunner, return_percent,
};
pub use task_runner::{JobSpec, TaskRunner};
pub use token_store::PgTokenCacheStore;
pub use universe::UniverseSelector;
pub use validate::validate_bar;

pub mod prelude {
  pub use crate::{
    AnalysisKind,
    AnalyzeOptions,
    CollectOptions,
    CollectPlan,
    CollectorError,
    CollectorResult,
    Counters,
    HistoryCollector,
    JobSpec,
    PgTokenCacheStore,
    SignalRunner,
    TaskRunner,
    UniverseSelector,
  };
}
