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

//! The freshness oracle: decides per stock whether to skip, incrementally
//! collect, or fully refetch its price history.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use kis_core::Market;

/// KR cash session closes 15:30 KST (06:30 UTC); settled data shortly after
fn kr_post_close_utc() -> NaiveTime {
  NaiveTime::from_hms_opt(7, 0, 0).unwrap()
}

/// US regular session closes 16:00 ET (21:00 UTC); one hour of settle margin
fn us_post_close_utc() -> NaiveTime {
  NaiveTime::from_hms_opt(22, 0, 0).unwrap()
}

/// Collection plan for a single stock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectPlan {
  /// History is current through the last trading day
  Skip { last_date: NaiveDate },
  /// Fetch only `[start, today]`
  Incremental { start: NaiveDate, last_date: NaiveDate },
  /// Fetch the full look-back window
  Full,
}

impl CollectPlan {
  pub fn mode_label(&self) -> &'static str {
    match self {
      CollectPlan::Skip { .. } => "skip",
      CollectPlan::Incremental { .. } => "incremental",
      CollectPlan::Full => "full",
    }
  }
}

/// Most recent trading day whose daily bar the broker can serve, given the
/// wall clock. Before the market's post-close threshold the current day's bar
/// is not final, so the previous day is used; weekends roll back to Friday.
pub fn last_trading_day(market: Market, now: DateTime<Utc>) -> NaiveDate {
  let threshold = match market {
    Market::Kr => kr_post_close_utc(),
    Market::Us => us_post_close_utc(),
  };

  let mut candidate = if now.time() < threshold {
    now.date_naive() - Duration::days(1)
  } else {
    now.date_naive()
  };

  while matches!(candidate.weekday(), Weekday::Sat | Weekday::Sun) {
    candidate -= Duration::days(1);
  }

  candidate
}

/// The hybrid full / incremental / skip decision.
///
/// `last_date` is the newest stored history date, when one exists; it is only
/// consulted once the record count clears the minimum.
pub fn decide(
  history_records_count: i32,
  last_date: Option<NaiveDate>,
  last_trading_day: NaiveDate,
  min_records: i32,
) -> CollectPlan {
  if history_records_count == 0 || history_records_count < min_records {
    return CollectPlan::Full;
  }

  match last_date {
    None => CollectPlan::Full,
    Some(date) if date >= last_trading_day => CollectPlan::Skip { last_date: date },
    Some(date) => {
      CollectPlan::Incremental { start: date + Duration::days(1), last_date: date }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  // 2024-01-15 is a Monday.

  #[test]
  fn test_last_trading_day_after_kr_close() {
    let now = utc(2024, 1, 15, 8, 0);
    assert_eq!(last_trading_day(Market::Kr, now), date(2024, 1, 15));
  }

  #[test]
  fn test_last_trading_day_before_kr_close_rolls_back() {
    let now = utc(2024, 1, 15, 5, 0);
    // Monday pre-close rolls to the previous Friday
    assert_eq!(last_trading_day(Market::Kr, now), date(2024, 1, 12));
  }

  #[test]
  fn test_last_trading_day_us_pre_close() {
    // 20:00 UTC Tuesday is before the US post-close threshold
    let now = utc(2024, 1, 16, 20, 0);
    assert_eq!(last_trading_day(Market::Us, now), date(2024, 1, 15));
  }

  #[test]
  fn test_last_trading_day_us_post_close() {
    let now = utc(2024, 1, 16, 23, 0);
    assert_eq!(last_trading_day(Market::Us, now), date(2024, 1, 16));
  }

  #[test]
  fn test_weekend_rolls_back_to_friday() {
    // Saturday and Sunday both resolve to Friday 2024-01-13/14 -> 01-12
    let saturday = utc(2024, 1, 13, 12, 0);
    assert_eq!(last_trading_day(Market::Kr, saturday), date(2024, 1, 12));

    let sunday = utc(2024, 1, 14, 12, 0);
    assert_eq!(last_trading_day(Market::Us, sunday), date(2024, 1, 12));
  }

  #[test]
  fn test_decide_empty_history_is_full() {
    assert_eq!(decide(0, None, date(2024, 1, 15), 60), CollectPlan::Full);
  }

  #[test]
  fn test_decide_thin_history_is_full() {
    // Below the minimum even with a recent last date
    let plan = decide(59, Some(date(2024, 1, 15)), date(2024, 1, 15), 60);
    assert_eq!(plan, CollectPlan::Full);
  }

  #[test]
  fn test_decide_counted_but_missing_rows_is_full() {
    assert_eq!(decide(150, None, date(2024, 1, 15), 60), CollectPlan::Full);
  }

  #[test]
  fn test_decide_current_history_skips() {
    let plan = decide(150, Some(date(2024, 1, 15)), date(2024, 1, 15), 60);
    assert_eq!(plan, CollectPlan::Skip { last_date: date(2024, 1, 15) });
  }

  #[test]
  fn test_decide_ahead_of_trading_day_skips() {
    let plan = decide(150, Some(date(2024, 1, 16)), date(2024, 1, 15), 60);
    assert!(matches!(plan, CollectPlan::Skip { .. }));
  }

  #[test]
  fn test_decide_stale_history_is_incremental() {
    let plan = decide(150, Some(date(2024, 1, 10)), date(2024, 1, 15), 60);
    assert_eq!(
      plan,
      CollectPlan::Incremental { start: date(2024, 1, 11), last_date: date(2024, 1, 10) }
    );
  }

  #[test]
  fn test_mode_labels() {
    assert_eq!(CollectPlan::Full.mode_label(), "full");
    assert_eq!(CollectPlan::Skip { last_date: date(2024, 1, 15) }.mode_label(), "skip");
    assert_eq!(
      CollectPlan::Incremental { start: date(2024, 1, 11), last_date: date(2024, 1, 10) }
        .mode_label(),
      "incremental"
    );
  }
}
