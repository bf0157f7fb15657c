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

//! Ordinary-least-squares trendline over (bar index, price) points.

use crate::swing::SwingPoint;

/// `y = slope * index + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trendline {
  pub slope: f64,
  pub intercept: f64,
}

impl Trendline {
  pub fn value_at(&self, index: usize) -> f64 {
    self.slope * index as f64 + self.intercept
  }

  /// Trendline value at an absolute index, usable past the fitted range
  pub fn value_at_i64(&self, index: i64) -> f64 {
    self.slope * index as f64 + self.intercept
  }

  pub fn is_descending(&self) -> bool {
    self.slope < 0.0
  }
}

/// Fit by ordinary least squares. Needs at least two distinct indices.
pub fn fit_trendline(points: &[SwingPoint]) -> Option<Trendline> {
  if points.len() < 2 {
    return None;
  }

  let n = points.len() as f64;
  let mean_x = points.iter().map(|p| p.index as f64).sum::<f64>() / n;
  let mean_y = points.iter().map(|p| p.price).sum::<f64>() / n;

  let mut cov = 0.0;
  let mut var = 0.0;
  for p in points {
    let dx = p.index as f64 - mean_x;
    cov += dx * (p.price - mean_y);
    var += dx * dx;
  }

  if var == 0.0 {
    return None;
  }

  let slope = cov / var;
  let intercept = mean_y - slope * mean_x;
  Some(Trendline { slope, intercept })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fit_exact_line() {
    // Points on y = -0.5x + 100
    let points = vec![
      SwingPoint { index: 10, price: 95.0 },
      SwingPoint { index: 20, price: 90.0 },
      SwingPoint { index: 30, price: 85.0 },
    ];

    let tl = fit_trendline(&points).unwrap();
    assert!((tl.slope + 0.5).abs() < 1e-9);
    assert!((tl.intercept - 100.0).abs() < 1e-9);
    assert!(tl.is_descending());
    assert!((tl.value_at(40) - 80.0).abs() < 1e-9);
  }

  #[test]
  fn test_fit_spec_scenario_points() {
    // Lower highs at bars 10, 25, 40 priced 100, 95, 90: slope -1/3
    let points = vec![
      SwingPoint { index: 10, price: 100.0 },
      SwingPoint { index: 25, price: 95.0 },
      SwingPoint { index: 40, price: 90.0 },
    ];

    let tl = fit_trendline(&points).unwrap();
    assert!((tl.slope + 1.0 / 3.0).abs() < 1e-9);
    assert!((tl.value_at(40) - 90.0).abs() < 1e-9);
  }

  #[test]
  fn test_fit_needs_two_points() {
    assert!(fit_trendline(&[SwingPoint { index: 1, price: 10.0 }]).is_none());
    assert!(fit_trendline(&[]).is_none());
  }

  #[test]
  fn test_fit_rejects_vertical_points() {
    let points = vec![
      SwingPoint { index: 10, price: 100.0 },
      SwingPoint { index: 10, price: 90.0 },
    ];
    assert!(fit_trendline(&points).is_none());
  }

  #[test]
  fn test_ascending_line_not_descending() {
    let points = vec![
      SwingPoint { index: 10, price: 90.0 },
      SwingPoint { index: 20, price: 95.0 },
    ];
    let tl = fit_trendline(&points).unwrap();
    assert!(!tl.is_descending());
  }
}
