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

//! Moving-average strategy family: golden/death crosses, support/resistance
//! bounces, MA breakouts and alignment transitions over SMA 20/50/200.

use crate::indicators::{macd, sma};
use crate::series::Series;
use crate::strategy::{
  MaAlignmentDetails, MaBreakoutDetails, MaCrossDetails, MaLevelDetails, SignalEmission,
  SignalKind, Strategy, StrategyFamily, names,
};

/// SMA periods evaluated by the family
pub const MA_PERIODS: [usize; 3] = [20, 50, 200];

/// MACD periods backing the cross-confirmation detail
const MACD_PERIODS: (usize, usize, usize) = (12, 26, 9);

#[derive(Debug, Clone)]
pub struct MovingAverageStrategy {
  /// Bars scanned for golden/death crosses, from the series end
  pub cross_window: usize,
  /// Bars scanned for the remaining detectors, from the series end
  pub recent_window: usize,
  /// Proximity band for support/resistance detection (%)
  pub level_threshold_pct: f64,
}

impl Default for MovingAverageStrategy {
  fn default() -> Self {
    Self { cross_window: 10, recent_window: 5, level_threshold_pct: 2.0 }
  }
}

struct MaColumns {
  ma20: Vec<Option<f64>>,
  ma50: Vec<Option<f64>>,
  ma200: Vec<Option<f64>>,
}

impl MaColumns {
  fn of(&self, period: usize) -> &[Option<f64>] {
    match period {
      20 => &self.ma20,
      50 => &self.ma50,
      _ => &self.ma200,
    }
  }
}

impl MovingAverageStrategy {
  fn columns(&self, series: &Series) -> MaColumns {
    let closes = series.closes();
    MaColumns { ma20: sma(&closes, 20), ma50: sma(&closes, 50), ma200: sma(&closes, 200) }
  }

  fn detect_crosses(&self, series: &Series, ma: &MaColumns, out: &mut Vec<SignalEmission>) {
    let bars = series.bars();
    let n = bars.len();
    let start = n.saturating_sub(self.cross_window).max(1);

    let (macd_fast, macd_slow, macd_signal) = MACD_PERIODS;
    let trend = macd(&series.closes(), macd_fast, macd_slow, macd_signal);

    for i in start..n {
      let (Some(fast_prev), Some(slow_prev), Some(fast), Some(slow)) =
        (ma.ma50[i - 1], ma.ma200[i - 1], ma.ma50[i], ma.ma200[i])
      else {
        continue;
      };

      let cross_up = fast_prev < slow_prev && fast > slow;
      let cross_down = fast_prev > slow_prev && fast < slow;
      if !cross_up && !cross_down {
        continue;
      }

      let (strategy_name, kind, cross_type) = if cross_up {
        (names::GOLDEN_CROSS, SignalKind::Buy, "golden")
      } else {
        (names::DEATH_CROSS, SignalKind::Sell, "death")
      };

      out.push(SignalEmission {
        strategy_name,
        kind,
        date: bars[i].date,
        price: bars[i].close,
        details: serde_json::to_value(MaCrossDetails {
          ma_50: fast,
          ma_200: slow,
          cross_type: cross_type.to_string(),
          macd_histogram: trend.histogram[i],
        })
        .unwrap_or_default(),
      });
    }
  }

  fn detect_support_resistance(
    &self,
    series: &Series,
    ma: &MaColumns,
    out: &mut Vec<SignalEmission>,
  ) {
    let bars = series.bars();
    let n = bars.len();
    let start = n.saturating_sub(self.recent_window);
    let threshold = self.level_threshold_pct / 100.0;

    for period in MA_PERIODS {
      let column = ma.of(period);
      for i in start..n {
        let Some(ma_value) = column[i] else { continue };
        if ma_value <= 0.0 {
          continue;
        }

        let bar = &bars[i];

        // Support: the low probes the MA, the close holds above on a green bar
        let distance_low = (bar.low - ma_value).abs() / ma_value;
        if distance_low <= threshold && bar.close > ma_value && bar.close > bar.open {
          out.push(SignalEmission {
            strategy_name: names::MA_SUPPORT,
            kind: SignalKind::Buy,
            date: bar.date,
            price: bar.close,
            details: serde_json::to_value(MaLevelDetails {
              ma_period: period,
              ma_value,
              distance_pct: distance_low * 100.0,
              bounce_type: "support".to_string(),
            })
            .unwrap_or_default(),
          });
        }

        // Resistance: the high probes the MA, the close is rejected on a red bar
        let distance_high = (bar.high - ma_value).abs() / ma_value;
        if distance_high <= threshold && bar.close < ma_value && bar.close < bar.open {
          out.push(SignalEmission {
            strategy_name: names::MA_RESISTANCE,
            kind: SignalKind::Sell,
            date: bar.date,
            price: bar.close,
            details: serde_json::to_value(MaLevelDetails {
              ma_period: period,
              ma_value,
              distance_pct: distance_high * 100.0,
              bounce_type: "resistance".to_string(),
            })
            .unwrap_or_default(),
          });
        }
      }
    }
  }

  fn detect_breakouts(&self, series: &Series, ma: &MaColumns, out: &mut Vec<SignalEmission>) {
    let bars = series.bars();
    let n = bars.len();
    let start = n.saturating_sub(self.recent_window).max(1);

    for period in MA_PERIODS {
      let column = ma.of(period);
      for i in start..n {
        let (Some(ma_prev), Some(ma_curr)) = (column[i - 1], column[i]) else { continue };

        let close_prev = bars[i - 1].close;
        let close_curr = bars[i].close;

        if close_prev < ma_prev && close_curr > ma_curr {
          out.push(SignalEmission {
            strategy_name: names::MA_BREAKOUT_UP,
            kind: SignalKind::Buy,
            date: bars[i].date,
            price: close_curr,
            details: serde_json::to_value(MaBreakoutDetails {
              ma_period: period,
              ma_value: ma_curr,
              breakout_direction: "up".to_string(),
            })
            .unwrap_or_default(),
          });
        } else if close_prev > ma_prev && close_curr < ma_curr {
          out.push(SignalEmission {
            strategy_name: names::MA_BREAKOUT_DOWN,
            kind: SignalKind::Sell,
            date: bars[i].date,
            price: close_curr,
            details: serde_json::to_value(MaBreakoutDetails {
              ma_period: period,
              ma_value: ma_curr,
              breakout_direction: "down".to_string(),
            })
            .unwrap_or_default(),
          });
        }
      }
    }
  }

  fn detect_alignment(&self, series: &Series, ma: &MaColumns, out: &mut Vec<SignalEmission>) {
    let bars = series.bars();
    let n = bars.len();
    let start = n.saturating_sub(self.recent_window).max(1);

    for i in start..n {
      let (Some(m20p), Some(m50p), Some(m200p), Some(m20), Some(m50), Some(m200)) =
        (ma.ma20[i - 1], ma.ma50[i - 1], ma.ma200[i - 1], ma.ma20[i], ma.ma50[i], ma.ma200[i])
      else {
        continue;
      };

      let bullish_now = m20 > m50 && m50 > m200;
      let bearish_now = m200 > m50 && m50 > m20;
      let bullish_prev = m20p > m50p && m50p > m200p;
      let bearish_prev = m200p > m50p && m50p > m20p;

      if bullish_now && !bullish_prev {
        out.push(SignalEmission {
          strategy_name: names::MA_BULLISH_ALIGNMENT,
          kind: SignalKind::Buy,
          date: bars[i].date,
          price: bars[i].close,
          details: serde_json::to_value(MaAlignmentDetails {
            ma_20: m20,
            ma_50: m50,
            ma_200: m200,
            alignment: "bullish".to_string(),
          })
          .unwrap_or_default(),
        });
      }

      if bearish_now && !bearish_prev {
        out.push(SignalEmission {
          strategy_name: names::MA_BEARISH_ALIGNMENT,
          kind: SignalKind::Sell,
          date: bars[i].date,
          price: bars[i].close,
          details: serde_json::to_value(MaAlignmentDetails {
            ma_20: m20,
            ma_50: m50,
            ma_200: m200,
            alignment: "bearish".to_string(),
          })
          .unwrap_or_default(),
        });
      }
    }
  }
}

impl Strategy for MovingAverageStrategy {
  fn name(&self) -> &'static str {
    names::GOLDEN_CROSS
  }

  fn family(&self) -> StrategyFamily {
    StrategyFamily::MovingAverage
  }

  fn analyze(&self, series: &Series) -> Vec<SignalEmission> {
    let mut out = Vec::new();
    if series.len() < 201 {
      return out;
    }

    let ma = self.columns(series);
    self.detect_crosses(series, &ma, &mut out);
    self.detect_support_resistance(series, &ma, &mut out);
    self.detect_breakouts(series, &ma, &mut out);
    self.detect_alignment(series, &ma, &mut out);
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::series::{Bar, bar, day};

  /// Build a series from per-bar close prices; OHLC hugs the close.
  fn series_from_closes(closes: &[f64]) -> Series {
    let bars: Vec<Bar> = closes
      .iter()
      .enumerate()
      .map(|(i, &c)| bar(day(i as u32), c - 0.5, c + 1.0, c - 1.0, c))
      .collect();
    Series::new(bars).unwrap()
  }

  fn named<'a>(emissions: &'a [SignalEmission], name: &str) -> Vec<&'a SignalEmission> {
    emissions.iter().filter(|e| e.strategy_name == name).collect()
  }

  #[test]
  fn test_short_series_emits_nothing() {
    let closes: Vec<f64> = (0..150).map(|i| 100.0 + i as f64 * 0.1).collect();
    let series = series_from_closes(&closes);
    assert!(MovingAverageStrategy::default().analyze(&series).is_empty());
  }

  #[test]
  fn test_golden_cross_on_recovery() {
    // Long decline pulls MA50 under MA200, then a sharp recovery lifts it back
    let mut closes: Vec<f64> = Vec::new();
    for i in 0..200 {
      closes.push(300.0 - i as f64); // decline: 300 -> 101
    }
    for i in 0..60 {
      closes.push(101.0 + i as f64 * 6.0); // steep recovery
    }
    let series = series_from_closes(&closes);

    let strategy = MovingAverageStrategy { cross_window: 60, ..Default::default() };
    let emissions = strategy.analyze(&series);

    let golden = named(&emissions, names::GOLDEN_CROSS);
    assert_eq!(golden.len(), 1);
    assert_eq!(golden[0].kind, SignalKind::Buy);

    let details: MaCrossDetails = serde_json::from_value(golden[0].details.clone()).unwrap();
    assert!(details.ma_50 > details.ma_200);
    assert_eq!(details.cross_type, "golden");
    // A cross inside a strong recovery carries positive MACD momentum
    assert!(details.macd_histogram.unwrap() > 0.0);

    assert!(named(&emissions, names::DEATH_CROSS).is_empty());
  }

  #[test]
  fn test_death_cross_on_rollover() {
    // Long rise keeps MA50 above MA200, then a steep sell-off drags it under
    let mut closes: Vec<f64> = Vec::new();
    for i in 0..200 {
      closes.push(100.0 + i as f64); // rise: 100 -> 299
    }
    for i in 0..60 {
      closes.push(299.0 - i as f64 * 6.0); // steep decline
    }
    let series = series_from_closes(&closes);

    let strategy = MovingAverageStrategy { cross_window: 60, ..Default::default() };
    let emissions = strategy.analyze(&series);

    let death = named(&emissions, names::DEATH_CROSS);
    assert_eq!(death.len(), 1);
    assert_eq!(death[0].kind, SignalKind::Sell);
  }

  #[test]
  fn test_ma_breakout_up_detected() {
    // Flat tape slightly under its own average, then the last bar pops above
    let mut closes: Vec<f64> = vec![100.0; 220];
    for (i, c) in closes.iter_mut().enumerate().skip(200) {
      *c = 98.0 + (i - 200) as f64 * 0.01; // drift below the 20-day MA
    }
    let n = closes.len();
    closes[n - 1] = 103.0; // pop through
    let series = series_from_closes(&closes);

    let emissions = MovingAverageStrategy::default().analyze(&series);
    let ups = named(&emissions, names::MA_BREAKOUT_UP);
    assert!(!ups.is_empty());
    assert!(ups.iter().all(|e| e.kind == SignalKind::Buy));
  }

  #[test]
  fn test_ma_support_bounce() {
    // Price rides above a rising MA20 and dips onto it with a green candle
    let mut closes: Vec<f64> = (0..230).map(|i| 100.0 + i as f64 * 0.5).collect();
    let n = closes.len();
    closes[n - 1] = closes[n - 2]; // flatten the last close a touch

    let mut bars: Vec<Bar> = closes
      .iter()
      .enumerate()
      .map(|(i, &c)| bar(day(i as u32), c - 0.5, c + 1.0, c - 1.0, c))
      .collect();

    // Compute where MA20 lands on the final bar and aim the low at it
    let ma20_last: f64 = closes[n - 20..].iter().sum::<f64>() / 20.0;
    bars[n - 1].low = ma20_last;
    bars[n - 1].open = ma20_last + 0.5;
    bars[n - 1].close = ma20_last + 2.0;
    bars[n - 1].high = ma20_last + 2.5;

    let series = Series::new(bars).unwrap();
    let emissions = MovingAverageStrategy::default().analyze(&series);

    let supports = named(&emissions, names::MA_SUPPORT);
    assert!(!supports.is_empty());
    let details: MaLevelDetails =
      serde_json::from_value(supports[0].details.clone()).unwrap();
    assert_eq!(details.bounce_type, "support");
    assert!(details.distance_pct <= 2.0);
  }

  #[test]
  fn test_bullish_alignment_transition() {
    // A decline (bearish stack) followed by a long strong recovery flips the
    // ordering to MA20 > MA50 > MA200 somewhere along the way.
    let mut closes: Vec<f64> = Vec::new();
    for i in 0..220 {
      closes.push(400.0 - i as f64); // decline: 400 -> 181
    }
    for i in 0..200 {
      closes.push(181.0 + i as f64 * 3.0); // recovery
    }
    let series = series_from_closes(&closes);

    let strategy = MovingAverageStrategy { recent_window: 200, ..Default::default() };
    let emissions = strategy.analyze(&series);

    let bullish = named(&emissions, names::MA_BULLISH_ALIGNMENT);
    assert_eq!(bullish.len(), 1);

    let details: MaAlignmentDetails =
      serde_json::from_value(bullish[0].details.clone()).unwrap();
    assert!(details.ma_20 > details.ma_50 && details.ma_50 > details.ma_200);
  }
}
