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

//! OHLCV row validation on ingestion. Violating rows are dropped with a
//! warning; they never stop the unit.

use kis_models::RawBar;

/// Reject intra-day ranges wider than this multiple of the low
const MAX_RANGE_RATIO: f64 = 10.0;

/// The persisted-row invariants:
/// all prices positive, volume non-negative, `low <= open,close <= high`,
/// and `(high - low) / low < 10`.
pub fn validate_bar(bar: &RawBar) -> Result<(), String> {
  let prices = [bar.open, bar.high, bar.low, bar.close];

  if prices.iter().any(|p| !p.is_finite()) {
    return Err("non-finite price".to_string());
  }
  if prices.iter().any(|&p| p <= 0.0) {
    return Err("non-positive price".to_string());
  }
  if bar.volume < 0 {
    return Err("negative volume".to_string());
  }
  if bar.low > bar.open.min(bar.close) {
    return Err(format!("low {} above open/close", bar.low));
  }
  if bar.high < bar.open.max(bar.close) {
    return Err(format!("high {} below open/close", bar.high));
  }

  let range_ratio = (bar.high - bar.low) / bar.low;
  if range_ratio >= MAX_RANGE_RATIO {
    return Err(format!("intra-day range ratio {:.2} out of bounds", range_ratio));
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn bar(open: f64, high: f64, low: f64, close: f64) -> RawBar {
    RawBar {
      date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
      open,
      high,
      low,
      close,
      volume: 1_000,
    }
  }

  #[test]
  fn test_well_formed_bar_passes() {
    assert!(validate_bar(&bar(100.0, 105.0, 98.0, 103.0)).is_ok());
  }

  #[test]
  fn test_zero_price_rejected() {
    // Defensive parsing turns missing fields into zeros; they must not persist
    assert!(validate_bar(&bar(0.0, 105.0, 98.0, 103.0)).is_err());
  }

  #[test]
  fn test_low_above_close_rejected() {
    assert!(validate_bar(&bar(100.0, 105.0, 101.0, 100.5)).is_err());
  }

  #[test]
  fn test_high_below_open_rejected() {
    assert!(validate_bar(&bar(106.0, 105.0, 98.0, 103.0)).is_err());
  }

  #[test]
  fn test_negative_volume_rejected() {
    let mut b = bar(100.0, 105.0, 98.0, 103.0);
    b.volume = -1;
    assert!(validate_bar(&b).is_err());
  }

  #[test]
  fn test_extreme_range_ratio_rejected() {
    // (high - low) / low = (1000 - 90) / 90 > 10
    assert!(validate_bar(&bar(100.0, 1000.0, 90.0, 100.0)).is_err());
  }

  #[test]
  fn test_range_ratio_just_under_bound_passes() {
    // (109 - 10) / 10 = 9.9
    assert!(validate_bar(&bar(10.0, 109.0, 10.0, 100.0)).is_ok());
  }

  #[test]
  fn test_equal_ohlc_passes() {
    assert!(validate_bar(&bar(100.0, 100.0, 100.0, 100.0)).is_ok());
  }
}
