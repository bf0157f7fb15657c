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

//! Descending-trendline strategy family: actual breakouts, approaching
//! breakouts, and post-breakout pullbacks off one fitted trendline.

use crate::indicators::rsi;
use crate::series::{Bar, Series};
use crate::strategy::{
  ApproachingDetails, BreakoutDetails, PullbackDetails, SignalEmission, SignalKind, Strategy,
  StrategyFamily, names,
};
use crate::swing::{DEFAULT_SWING_WINDOW, lower_highs, swing_highs};
use crate::trendline::{Trendline, fit_trendline};
use chrono::NaiveDate;

/// RSI period recorded in approaching-signal details
const RSI_PERIOD: usize = 14;

/// Trendline family parameters; defaults follow the production tuning
#[derive(Debug, Clone)]
pub struct TrendlineBreakoutStrategy {
  /// Symmetric swing-detection window
  pub swing_window: usize,
  /// Minimum lower-high touches for a valid trendline
  pub min_touches: usize,
  /// Bars scanned for approaching signals, counted from the series end
  pub approach_window: usize,
  /// Max distance below the trendline for an approaching signal (%)
  pub approach_threshold_pct: f64,
  /// Bars scanned for pullbacks, counted from the series end
  pub pullback_window: usize,
  /// Max distance around the broken trendline for a pullback (%)
  pub pullback_threshold_pct: f64,
}

impl Default for TrendlineBreakoutStrategy {
  fn default() -> Self {
    Self {
      swing_window: DEFAULT_SWING_WINDOW,
      min_touches: 3,
      approach_window: 5,
      approach_threshold_pct: 3.0,
      pullback_window: 10,
      pullback_threshold_pct: 3.0,
    }
  }
}

impl TrendlineBreakoutStrategy {
  /// Fit the descending trendline for a series, if one exists
  pub fn fit(&self, series: &Series) -> Option<(Trendline, usize)> {
    let swings = swing_highs(series, self.swing_window);
    let descending_highs = lower_highs(&swings, self.min_touches);
    if descending_highs.len() < self.min_touches {
      return None;
    }

    let trendline = fit_trendline(&descending_highs)?;
    if !trendline.is_descending() {
      return None;
    }

    let last_touch = descending_highs.last().map(|p| p.index)?;
    Some((trendline, last_touch))
  }
}

impl Strategy for TrendlineBreakoutStrategy {
  fn name(&self) -> &'static str {
    names::DESCENDING_TRENDLINE_BREAKOUT
  }

  fn family(&self) -> StrategyFamily {
    StrategyFamily::Trendline
  }

  fn analyze(&self, series: &Series) -> Vec<SignalEmission> {
    let mut emissions = Vec::new();

    let Some((trendline, last_touch)) = self.fit(series) else {
      return emissions;
    };

    let bars = series.bars();
    let n = bars.len();

    // Actual breakouts: close crosses from below the line to above it
    let mut breakout_indices: Vec<usize> = Vec::new();
    for i in last_touch + 1..n {
      let prev_below = bars[i - 1].close <= trendline.value_at(i - 1);
      let now_above = bars[i].close > trendline.value_at(i);
      if prev_below && now_above {
        breakout_indices.push(i);
        emissions.push(SignalEmission {
          strategy_name: names::DESCENDING_TRENDLINE_BREAKOUT,
          kind: SignalKind::Buy,
          date: bars[i].date,
          price: bars[i].close,
          details: serde_json::to_value(BreakoutDetails {
            trendline_slope: trendline.slope,
            trendline_intercept: trendline.intercept,
            bar_index: i as i64,
          })
          .unwrap_or_default(),
        });
      }
    }

    // Approaching: still below the line, within the threshold, on a bullish bar
    let momentum = rsi(&series.closes(), RSI_PERIOD);
    let approach_start = n.saturating_sub(self.approach_window).max(last_touch + 1);
    for i in approach_start..n {
      let close = bars[i].close;
      if close <= 0.0 {
        continue;
      }
      let line = trendline.value_at(i);
      let distance_pct = (line - close) / close * 100.0;
      let bullish = close > bars[i].open;

      if distance_pct > 0.0 && distance_pct <= self.approach_threshold_pct && bullish {
        emissions.push(SignalEmission {
          strategy_name: names::APPROACHING_BREAKOUT,
          kind: SignalKind::Approaching,
          date: bars[i].date,
          price: close,
          details: serde_json::to_value(ApproachingDetails {
            trendline_slope: trendline.slope,
            trendline_intercept: trendline.intercept,
            bar_index: i as i64,
            distance_pct,
            rsi_14: momentum[i],
            breakout_confirmed: None,
            breakout_date: None,
          })
          .unwrap_or_default(),
        });
      }
    }

    // Pullback: after a breakout, price returns to within tolerance of the line
    if let Some(&breakout_idx) = breakout_indices.last() {
      let pullback_start = n.saturating_sub(self.pullback_window).max(breakout_idx + 1);
      for i in pullback_start..n {
        let line = trendline.value_at(i);
        if line <= 0.0 {
          continue;
        }
        let distance_pct = (bars[i].close - line).abs() / line * 100.0;
        if distance_pct <= self.pullback_threshold_pct {
          emissions.push(SignalEmission {
            strategy_name: names::PULLBACK_BUY,
            kind: SignalKind::Pullback,
            date: bars[i].date,
            price: bars[i].close,
            details: serde_json::to_value(PullbackDetails {
              trendline_slope: trendline.slope,
              trendline_intercept: trendline.intercept,
              bar_index: i as i64,
              breakout_index: breakout_idx as i64,
              distance_pct,
            })
            .unwrap_or_default(),
          });
        }
      }
    }

    emissions
  }
}

/// Outcome of an approaching-signal confirmation walk
#[derive(Debug, Clone, PartialEq)]
pub struct ApproachingOutcome {
  pub confirmed: bool,
  pub breakout_date: Option<NaiveDate>,
}

/// Walk up to `max_forward` bars past an approaching signal and decide whether
/// the trendline was actually broken.
///
/// `bars_after` holds the bars strictly following the signal bar, in order;
/// bar `k` of that slice sits at absolute index `signal_bar_index + k + 1` in
/// the coordinates the trendline was fitted in. Returns `None` while fewer
/// than `max_forward` bars have elapsed without a break - the signal stays
/// unresolved for the next run.
pub fn confirm_approaching(
  trendline_slope: f64,
  trendline_intercept: f64,
  signal_bar_index: i64,
  bars_after: &[Bar],
  max_forward: usize,
) -> Option<ApproachingOutcome> {
  for (k, bar) in bars_after.iter().take(max_forward).enumerate() {
    let line = trendline_slope * (signal_bar_index + k as i64 + 1) as f64 + trendline_intercept;
    if bar.high > line {
      return Some(ApproachingOutcome { confirmed: true, breakout_date: Some(bar.date) });
    }
  }

  if bars_after.len() >= max_forward {
    Some(ApproachingOutcome { confirmed: false, breakout_date: None })
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::series::{bar, day};

  /// 60 flat bars with swing highs at 10/25/40 priced 100/95/90.
  /// The fitted line is y = -x/3 + 103.33.
  fn descending_series(mutate: impl Fn(&mut Vec<Bar>)) -> Series {
    let mut bars: Vec<Bar> =
      (0..60).map(|i| bar(day(i), 80.0, 82.0, 78.0, 80.0)).collect();
    bars[10].high = 100.0;
    bars[25].high = 95.0;
    bars[40].high = 90.0;
    mutate(&mut bars);
    Series::new(bars).unwrap()
  }

  fn emissions_named<'a>(
    emissions: &'a [SignalEmission],
    name: &str,
  ) -> Vec<&'a SignalEmission> {
    emissions.iter().filter(|e| e.strategy_name == name).collect()
  }

  #[test]
  fn test_breakout_detected_on_cross() {
    let series = descending_series(|bars| {
      bars[50].close = 92.0;
      bars[50].high = 93.0;
    });

    let strategy = TrendlineBreakoutStrategy::default();
    let emissions = strategy.analyze(&series);
    let breakouts = emissions_named(&emissions, names::DESCENDING_TRENDLINE_BREAKOUT);

    assert_eq!(breakouts.len(), 1);
    assert_eq!(breakouts[0].date, day(50));
    assert_eq!(breakouts[0].kind, SignalKind::Buy);
    assert_eq!(breakouts[0].price, 92.0);

    let details: BreakoutDetails =
      serde_json::from_value(breakouts[0].details.clone()).unwrap();
    assert!((details.trendline_slope + 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(details.bar_index, 50);
  }

  #[test]
  fn test_two_bars_above_line_is_single_breakout() {
    // Bars 50 and 51 both close above the line; only the 49->50 transition
    // crosses it, so exactly one signal fires.
    let series = descending_series(|bars| {
      bars[50].close = 92.0;
      bars[50].high = 93.0;
      bars[51].close = 90.0;
      bars[51].high = 91.0;
    });

    let strategy = TrendlineBreakoutStrategy::default();
    let emissions = strategy.analyze(&series);
    let breakouts = emissions_named(&emissions, names::DESCENDING_TRENDLINE_BREAKOUT);

    assert_eq!(breakouts.len(), 1);
    assert_eq!(breakouts[0].date, day(50));
  }

  #[test]
  fn test_no_breakout_below_line() {
    let series = descending_series(|_| {});
    let strategy = TrendlineBreakoutStrategy::default();
    let emissions = strategy.analyze(&series);
    assert!(emissions_named(&emissions, names::DESCENDING_TRENDLINE_BREAKOUT).is_empty());
  }

  #[test]
  fn test_approaching_signal_near_line() {
    // tl(57) = 103.33 - 19 = 84.33; a bullish close at 83 sits 1.6% below
    let series = descending_series(|bars| {
      bars[57].open = 82.0;
      bars[57].close = 83.0;
      bars[57].high = 83.5;
    });

    let strategy = TrendlineBreakoutStrategy::default();
    let emissions = strategy.analyze(&series);
    let approaching = emissions_named(&emissions, names::APPROACHING_BREAKOUT);

    assert_eq!(approaching.len(), 1);
    assert_eq!(approaching[0].date, day(57));
    assert_eq!(approaching[0].kind, SignalKind::Approaching);

    let details: ApproachingDetails =
      serde_json::from_value(approaching[0].details.clone()).unwrap();
    assert!(details.distance_pct > 0.0 && details.distance_pct <= 3.0);
    let rsi_14 = details.rsi_14.unwrap();
    assert!((0.0..=100.0).contains(&rsi_14));
    assert_eq!(details.breakout_confirmed, None);
    assert_eq!(details.breakout_date, None);
  }

  #[test]
  fn test_approaching_requires_bullish_bar() {
    let series = descending_series(|bars| {
      bars[57].open = 84.0;
      bars[57].close = 83.0; // red candle near the line
      bars[57].high = 84.5;
    });

    let strategy = TrendlineBreakoutStrategy::default();
    let emissions = strategy.analyze(&series);
    assert!(emissions_named(&emissions, names::APPROACHING_BREAKOUT).is_empty());
  }

  #[test]
  fn test_pullback_after_breakout() {
    // Breakout at 50, then bar 55 closes back within 3% of the line
    // (tl(55) = 85.0; close 86 is 1.18% away)
    let series = descending_series(|bars| {
      bars[50].close = 92.0;
      bars[50].high = 93.0;
      bars[55].open = 87.0;
      bars[55].close = 86.0;
      bars[55].high = 88.0;
    });

    let strategy = TrendlineBreakoutStrategy::default();
    let emissions = strategy.analyze(&series);
    let pullbacks = emissions_named(&emissions, names::PULLBACK_BUY);

    assert_eq!(pullbacks.len(), 1);
    assert_eq!(pullbacks[0].date, day(55));
    assert_eq!(pullbacks[0].kind, SignalKind::Pullback);

    let details: PullbackDetails =
      serde_json::from_value(pullbacks[0].details.clone()).unwrap();
    assert_eq!(details.breakout_index, 50);
    assert!(details.distance_pct <= 3.0);
  }

  #[test]
  fn test_rising_highs_emit_nothing() {
    let mut bars: Vec<Bar> =
      (0..60).map(|i| bar(day(i), 80.0, 82.0, 78.0, 80.0)).collect();
    bars[10].high = 90.0;
    bars[25].high = 95.0;
    bars[40].high = 100.0;
    let series = Series::new(bars).unwrap();

    let strategy = TrendlineBreakoutStrategy::default();
    assert!(strategy.analyze(&series).is_empty());
  }

  #[test]
  fn test_short_series_emits_nothing() {
    let bars: Vec<Bar> = (0..20).map(|i| bar(day(i), 80.0, 82.0, 78.0, 80.0)).collect();
    let series = Series::new(bars).unwrap();
    let strategy = TrendlineBreakoutStrategy::default();
    assert!(strategy.analyze(&series).is_empty());
  }

  #[test]
  fn test_confirm_approaching_hit() {
    // Signal at absolute index 55 on a line y = -x/3 + 103.33;
    // the next bar's high pierces the line.
    let slope = -1.0 / 3.0;
    let intercept = 103.0 + 1.0 / 3.0;
    let line_at_56 = slope * 56.0 + intercept;

    let bars_after =
      vec![bar(day(56), 83.0, line_at_56 + 1.0, 82.0, 84.0), bar(day(57), 84.0, 85.0, 83.0, 84.5)];

    let outcome = confirm_approaching(slope, intercept, 55, &bars_after, 3).unwrap();
    assert!(outcome.confirmed);
    assert_eq!(outcome.breakout_date, Some(day(56)));
  }

  #[test]
  fn test_confirm_approaching_miss_after_three_bars() {
    let slope = -1.0 / 3.0;
    let intercept = 103.0 + 1.0 / 3.0;

    let bars_after: Vec<Bar> =
      (56..60).map(|i| bar(day(i), 80.0, 81.0, 79.0, 80.0)).collect();

    let outcome = confirm_approaching(slope, intercept, 55, &bars_after, 3).unwrap();
    assert!(!outcome.confirmed);
    assert_eq!(outcome.breakout_date, None);
  }

  #[test]
  fn test_confirm_approaching_unresolved_when_too_few_bars() {
    let slope = -1.0 / 3.0;
    let intercept = 103.0 + 1.0 / 3.0;

    let bars_after = vec![bar(day(56), 80.0, 81.0, 79.0, 80.0)];
    assert_eq!(confirm_approaching(slope, intercept, 55, &bars_after, 3), None);
  }
}
