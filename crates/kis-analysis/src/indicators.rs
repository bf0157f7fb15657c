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

//! Rolling indicators as streaming reductions over close prices.
//!
//! Values are aligned with the input: position `i` is `None` until the full
//! window is available.

/// Simple moving average over `period` values
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
  let mut out = vec![None; values.len()];
  if period == 0 || values.len() < period {
    return out;
  }

  let mut window_sum: f64 = values[..period].iter().sum();
  out[period - 1] = Some(window_sum / period as f64);

  for i in period..values.len() {
    window_sum += values[i] - values[i - period];
    out[i] = Some(window_sum / period as f64);
  }

  out
}

/// Exponential moving average seeded with the SMA of the first window
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
  let mut out = vec![None; values.len()];
  if period == 0 || values.len() < period {
    return out;
  }

  let alpha = 2.0 / (period as f64 + 1.0);
  let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
  out[period - 1] = Some(seed);

  let mut prev = seed;
  for i in period..values.len() {
    prev = alpha * values[i] + (1.0 - alpha) * prev;
    out[i] = Some(prev);
  }

  out
}

/// Relative strength index (simple-average variant, 0..=100)
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
  let mut out = vec![None; values.len()];
  if period == 0 || values.len() <= period {
    return out;
  }

  let mut gains = vec![0.0; values.len()];
  let mut losses = vec![0.0; values.len()];
  for i in 1..values.len() {
    let delta = values[i] - values[i - 1];
    if delta > 0.0 {
      gains[i] = delta;
    } else {
      losses[i] = -delta;
    }
  }

  for i in period..values.len() {
    let avg_gain: f64 = gains[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
    let avg_loss: f64 = losses[i + 1 - period..=i].iter().sum::<f64>() / period as f64;

    out[i] = if avg_loss == 0.0 {
      Some(100.0)
    } else {
      let rs = avg_gain / avg_loss;
      Some(100.0 - 100.0 / (1.0 + rs))
    };
  }

  out
}

/// MACD line, signal line and histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
  pub macd: Vec<Option<f64>>,
  pub signal: Vec<Option<f64>>,
  pub histogram: Vec<Option<f64>>,
}

/// MACD over the standard fast/slow/signal EMA periods
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> Macd {
  let fast_ema = ema(values, fast);
  let slow_ema = ema(values, slow);

  let macd_line: Vec<Option<f64>> = fast_ema
    .iter()
    .zip(slow_ema.iter())
    .map(|(f, s)| match (f, s) {
      (Some(f), Some(s)) => Some(f - s),
      _ => None,
    })
    .collect();

  // The signal line is an EMA of the defined MACD segment
  let first_defined = macd_line.iter().position(Option::is_some).unwrap_or(macd_line.len());
  let defined: Vec<f64> = macd_line[first_defined..].iter().flatten().copied().collect();
  let signal_tail = ema(&defined, signal_period);

  let mut signal = vec![None; macd_line.len()];
  for (offset, value) in signal_tail.into_iter().enumerate() {
    signal[first_defined + offset] = value;
  }

  let histogram: Vec<Option<f64>> = macd_line
    .iter()
    .zip(signal.iter())
    .map(|(m, s)| match (m, s) {
      (Some(m), Some(s)) => Some(m - s),
      _ => None,
    })
    .collect();

  Macd { macd: macd_line, signal, histogram }
}

/// Mean of the most recent `window` values; `None` when empty
pub fn mean_of_recent(values: &[f64], window: usize) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  let take = window.min(values.len());
  let slice = &values[values.len() - take..];
  Some(slice.iter().sum::<f64>() / take as f64)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sma_alignment_and_values() {
    let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    let out = sma(&values, 3);

    assert_eq!(out[0], None);
    assert_eq!(out[1], None);
    assert_eq!(out[2], Some(2.0));
    assert_eq!(out[3], Some(3.0));
    assert_eq!(out[4], Some(4.0));
  }

  #[test]
  fn test_sma_window_larger_than_input() {
    let values = vec![1.0, 2.0];
    assert!(sma(&values, 3).iter().all(Option::is_none));
  }

  #[test]
  fn test_ema_seeds_with_sma() {
    let values = vec![2.0, 4.0, 6.0, 8.0];
    let out = ema(&values, 3);

    assert_eq!(out[2], Some(4.0));
    // alpha = 0.5: 0.5*8 + 0.5*4 = 6
    assert_eq!(out[3], Some(6.0));
  }

  #[test]
  fn test_rsi_all_gains_is_100() {
    let values: Vec<f64> = (1..=20).map(|v| v as f64).collect();
    let out = rsi(&values, 14);
    assert_eq!(out[19], Some(100.0));
  }

  #[test]
  fn test_rsi_balanced_is_50() {
    // Alternating +1/-1 deltas over an even window
    let mut values = vec![10.0];
    for i in 0..20 {
      let last = *values.last().unwrap();
      values.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
    }
    let out = rsi(&values, 14);
    let last = out.last().unwrap().unwrap();
    assert!((last - 50.0).abs() < 1e-9);
  }

  #[test]
  fn test_mean_of_recent_caps_at_len() {
    let values = vec![1.0, 2.0, 3.0];
    assert_eq!(mean_of_recent(&values, 90), Some(2.0));
    assert_eq!(mean_of_recent(&values, 2), Some(2.5));
    assert_eq!(mean_of_recent(&[], 90), None);
  }

  #[test]
  fn test_ma90_law_over_long_series() {
    let values: Vec<f64> = (1..=120).map(|v| v as f64).collect();
    // Mean of values 31..=120
    let expected = (31..=120).sum::<i64>() as f64 / 90.0;
    let got = mean_of_recent(&values, 90).unwrap();
    assert!((got - expected).abs() < 1e-6);
  }

  #[test]
  fn test_macd_alignment() {
    let values: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64) * 0.5).collect();
    let result = macd(&values, 12, 26, 9);

    assert_eq!(result.macd.len(), values.len());
    assert_eq!(result.macd[24], None);
    assert!(result.macd[25].is_some());
    // Signal needs 9 defined MACD values past index 25
    assert_eq!(result.signal[32], None);
    assert!(result.signal[33].is_some());
    assert!(result.histogram[33].is_some());
  }

  #[test]
  fn test_macd_positive_in_uptrend() {
    let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    let result = macd(&values, 12, 26, 9);
    assert!(result.macd.last().unwrap().unwrap() > 0.0);
  }

}
