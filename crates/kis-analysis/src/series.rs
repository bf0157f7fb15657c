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

//! An immutable, date-ascending OHLCV series. All strategy functions operate
//! on [`Series`] and never touch I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
  pub date: NaiveDate,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
  pub volume: i64,
}

#[derive(Error, Debug)]
pub enum SeriesError {
  #[error("Series dates must be strictly ascending at index {0}")]
  NotAscending(usize),
}

/// Ordered sequence of daily bars, strictly ascending by date
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
  bars: Vec<Bar>,
}

impl Series {
  pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
    for i in 1..bars.len() {
      if bars[i].date <= bars[i - 1].date {
        return Err(SeriesError::NotAscending(i));
      }
    }
    Ok(Self { bars })
  }

  pub fn bars(&self) -> &[Bar] {
    &self.bars
  }

  pub fn len(&self) -> usize {
    self.bars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bars.is_empty()
  }

  pub fn closes(&self) -> Vec<f64> {
    self.bars.iter().map(|b| b.close).collect()
  }

  /// Index of the bar carrying `date`, if present
  pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
    self.bars.binary_search_by_key(&date, |b| b.date).ok()
  }

  /// Bars strictly after `date`, in order
  pub fn bars_after(&self, date: NaiveDate) -> &[Bar] {
    let start = self.bars.partition_point(|b| b.date <= date);
    &self.bars[start..]
  }
}

#[cfg(test)]
pub(crate) fn bar(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Bar {
  Bar { date, open, high, low, close, volume: 1_000 }
}

#[cfg(test)]
pub(crate) fn day(n: u32) -> NaiveDate {
  // Weekday-agnostic synthetic calendar: one bar per ordinal day
  NaiveDate::from_num_days_from_ce_opt(738_000 + n as i32).unwrap()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_series_accepts_ascending_dates() {
    let bars = vec![
      bar(day(1), 10.0, 11.0, 9.0, 10.5),
      bar(day(2), 10.5, 11.5, 10.0, 11.0),
      bar(day(3), 11.0, 12.0, 10.5, 11.5),
    ];
    let series = Series::new(bars).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.closes(), vec![10.5, 11.0, 11.5]);
  }

  #[test]
  fn test_series_rejects_unsorted_dates() {
    let bars = vec![bar(day(2), 10.0, 11.0, 9.0, 10.5), bar(day(1), 10.5, 11.5, 10.0, 11.0)];
    assert!(matches!(Series::new(bars), Err(SeriesError::NotAscending(1))));
  }

  #[test]
  fn test_series_rejects_duplicate_dates() {
    let bars = vec![bar(day(1), 10.0, 11.0, 9.0, 10.5), bar(day(1), 10.5, 11.5, 10.0, 11.0)];
    assert!(Series::new(bars).is_err());
  }

  #[test]
  fn test_position_of_and_bars_after() {
    let bars = vec![
      bar(day(1), 10.0, 11.0, 9.0, 10.5),
      bar(day(2), 10.5, 11.5, 10.0, 11.0),
      bar(day(4), 11.0, 12.0, 10.5, 11.5),
    ];
    let series = Series::new(bars).unwrap();

    assert_eq!(series.position_of(day(2)), Some(1));
    assert_eq!(series.position_of(day(3)), None);

    let after = series.bars_after(day(2));
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].date, day(4));

    assert_eq!(series.bars_after(day(4)).len(), 0);
  }
}
