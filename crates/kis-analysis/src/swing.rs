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

//! Swing-point detection: local extrema over a symmetric window of bars.

use crate::series::Series;

/// Default symmetric window for swing detection
pub const DEFAULT_SWING_WINDOW: usize = 5;

/// A swing point: bar index and the extremum price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
  pub index: usize,
  pub price: f64,
}

/// Bars whose high strictly exceeds every high within `window` bars on both sides
pub fn swing_highs(series: &Series, window: usize) -> Vec<SwingPoint> {
  let bars = series.bars();
  let mut out = Vec::new();

  if bars.len() < 2 * window + 1 {
    return out;
  }

  for i in window..bars.len() - window {
    let candidate = bars[i].high;
    let is_swing = (i - window..=i + window)
      .filter(|&j| j != i)
      .all(|j| bars[j].high < candidate);
    if is_swing {
      out.push(SwingPoint { index: i, price: candidate });
    }
  }

  out
}

/// Symmetric on lows
pub fn swing_lows(series: &Series, window: usize) -> Vec<SwingPoint> {
  let bars = series.bars();
  let mut out = Vec::new();

  if bars.len() < 2 * window + 1 {
    return out;
  }

  for i in window..bars.len() - window {
    let candidate = bars[i].low;
    let is_swing = (i - window..=i + window)
      .filter(|&j| j != i)
      .all(|j| bars[j].low > candidate);
    if is_swing {
      out.push(SwingPoint { index: i, price: candidate });
    }
  }

  out
}

/// Longest subsequence of swing highs where each price is strictly below the
/// previous one. Returns empty when shorter than `min_count`.
pub fn lower_highs(swing_highs: &[SwingPoint], min_count: usize) -> Vec<SwingPoint> {
  if swing_highs.len() < min_count {
    return Vec::new();
  }

  let mut best: Vec<SwingPoint> = Vec::new();

  for start in 0..swing_highs.len() {
    let mut current = vec![swing_highs[start]];
    for &point in &swing_highs[start + 1..] {
      if point.price < current.last().map(|p| p.price).unwrap_or(f64::MAX) {
        current.push(point);
      }
    }
    if current.len() > best.len() {
      best = current;
    }
  }

  if best.len() >= min_count {
    best
  } else {
    Vec::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::series::{bar, day};

  fn flat_series_with_highs(n: u32, spikes: &[(usize, f64)]) -> Series {
    let mut bars: Vec<_> =
      (0..n).map(|i| bar(day(i), 80.0, 82.0, 78.0, 80.0)).collect();
    for &(idx, price) in spikes {
      bars[idx].high = price;
    }
    Series::new(bars).unwrap()
  }

  #[test]
  fn test_swing_high_detection() {
    let series = flat_series_with_highs(30, &[(10, 100.0), (20, 95.0)]);
    let highs = swing_highs(&series, 5);

    assert_eq!(highs.len(), 2);
    assert_eq!(highs[0], SwingPoint { index: 10, price: 100.0 });
    assert_eq!(highs[1], SwingPoint { index: 20, price: 95.0 });
  }

  #[test]
  fn test_swing_high_requires_strict_dominance() {
    // Two equal highs within one window: neither strictly dominates
    let series = flat_series_with_highs(30, &[(10, 100.0), (13, 100.0)]);
    let highs = swing_highs(&series, 5);
    assert!(highs.is_empty());
  }

  #[test]
  fn test_swing_edges_excluded() {
    // A spike inside the left window margin cannot be a swing point
    let series = flat_series_with_highs(30, &[(2, 100.0)]);
    assert!(swing_highs(&series, 5).is_empty());
  }

  #[test]
  fn test_swing_low_detection() {
    let mut bars: Vec<_> =
      (0..30).map(|i| bar(day(i), 80.0, 82.0, 78.0, 80.0)).collect();
    bars[15].low = 70.0;
    let series = Series::new(bars).unwrap();

    let lows = swing_lows(&series, 5);
    assert_eq!(lows, vec![SwingPoint { index: 15, price: 70.0 }]);
  }

  #[test]
  fn test_short_series_has_no_swings() {
    let series = flat_series_with_highs(8, &[(4, 100.0)]);
    assert!(swing_highs(&series, 5).is_empty());
  }

  #[test]
  fn test_lower_highs_longest_descending_run() {
    let points = vec![
      SwingPoint { index: 5, price: 90.0 },
      SwingPoint { index: 10, price: 100.0 },
      SwingPoint { index: 20, price: 95.0 },
      SwingPoint { index: 30, price: 97.0 },
      SwingPoint { index: 40, price: 92.0 },
    ];

    // Longest strictly-descending subsequence: 100 > 95 > 92
    let lh = lower_highs(&points, 3);
    assert_eq!(lh.len(), 3);
    assert_eq!(lh[0].price, 100.0);
    assert_eq!(lh[1].price, 95.0);
    assert_eq!(lh[2].price, 92.0);
  }

  #[test]
  fn test_lower_highs_below_min_count_is_empty() {
    let points = vec![
      SwingPoint { index: 10, price: 100.0 },
      SwingPoint { index: 20, price: 95.0 },
    ];
    assert!(lower_highs(&points, 3).is_empty());
  }

  #[test]
  fn test_lower_highs_rejects_rising_sequence() {
    let points = vec![
      SwingPoint { index: 10, price: 90.0 },
      SwingPoint { index: 20, price: 95.0 },
      SwingPoint { index: 30, price: 100.0 },
    ];
    assert!(lower_highs(&points, 3).is_empty());
  }
}
