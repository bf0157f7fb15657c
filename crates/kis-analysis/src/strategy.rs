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

//! The strategy capability set and its emission types.
//!
//! Each strategy family is a closed set of tagged variants writing to the
//! signal table under its own `strategy_name` keys; every variant carries a
//! typed details payload serialized into the signal's `details` blob.

use crate::series::Series;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod names {
  pub const DESCENDING_TRENDLINE_BREAKOUT: &str = "descending_trendline_breakout";
  pub const APPROACHING_BREAKOUT: &str = "approaching_breakout";
  pub const PULLBACK_BUY: &str = "pullback_buy";

  pub const GOLDEN_CROSS: &str = "golden_cross";
  pub const DEATH_CROSS: &str = "death_cross";
  pub const MA_SUPPORT: &str = "ma_support";
  pub const MA_RESISTANCE: &str = "ma_resistance";
  pub const MA_BREAKOUT_UP: &str = "ma_breakout_up";
  pub const MA_BREAKOUT_DOWN: &str = "ma_breakout_down";
  pub const MA_BULLISH_ALIGNMENT: &str = "ma_bullish_alignment";
  pub const MA_BEARISH_ALIGNMENT: &str = "ma_bearish_alignment";
}

/// Direction/intent of an emitted signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
  Buy,
  Sell,
  Pullback,
  Approaching,
  Hold,
}

impl SignalKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      SignalKind::Buy => "buy",
      SignalKind::Sell => "sell",
      SignalKind::Pullback => "pullback",
      SignalKind::Approaching => "approaching",
      SignalKind::Hold => "hold",
    }
  }
}

/// Strategy families sharing the signal table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyFamily {
  Trendline,
  MovingAverage,
}

impl StrategyFamily {
  /// Every `strategy_name` this family writes; used by re-analysis deletes
  /// and family-scoped queries.
  pub fn strategy_names(&self) -> &'static [&'static str] {
    match self {
      StrategyFamily::Trendline => &[
        names::DESCENDING_TRENDLINE_BREAKOUT,
        names::APPROACHING_BREAKOUT,
        names::PULLBACK_BUY,
      ],
      StrategyFamily::MovingAverage => &[
        names::GOLDEN_CROSS,
        names::DEATH_CROSS,
        names::MA_SUPPORT,
        names::MA_RESISTANCE,
        names::MA_BREAKOUT_UP,
        names::MA_BREAKOUT_DOWN,
        names::MA_BULLISH_ALIGNMENT,
        names::MA_BEARISH_ALIGNMENT,
      ],
    }
  }
}

/// One signal produced by a strategy run, prior to persistence
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEmission {
  pub strategy_name: &'static str,
  pub kind: SignalKind,
  pub date: NaiveDate,
  pub price: f64,
  pub details: serde_json::Value,
}

/// A strategy analyzes an immutable series and emits zero or more signals
pub trait Strategy: Send + Sync {
  fn name(&self) -> &'static str;

  fn family(&self) -> StrategyFamily;

  fn analyze(&self, series: &Series) -> Vec<SignalEmission>;
}

/// Details payload of trendline breakout signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutDetails {
  pub trendline_slope: f64,
  pub trendline_intercept: f64,
  pub bar_index: i64,
}

/// Details payload of approaching-breakout signals.
///
/// `breakout_confirmed` stays `None` until a later run resolves it, so the
/// history of near-misses vs hits survives re-analysis. `rsi_14` captures the
/// momentum context at emission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachingDetails {
  pub trendline_slope: f64,
  pub trendline_intercept: f64,
  pub bar_index: i64,
  pub distance_pct: f64,
  #[serde(default)]
  pub rsi_14: Option<f64>,
  pub breakout_confirmed: Option<bool>,
  pub breakout_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullbackDetails {
  pub trendline_slope: f64,
  pub trendline_intercept: f64,
  pub bar_index: i64,
  pub breakout_index: i64,
  pub distance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaCrossDetails {
  pub ma_50: f64,
  pub ma_200: f64,
  pub cross_type: String,
  /// MACD histogram at the cross, as trend confirmation
  #[serde(default)]
  pub macd_histogram: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaLevelDetails {
  pub ma_period: usize,
  pub ma_value: f64,
  pub distance_pct: f64,
  pub bounce_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaBreakoutDetails {
  pub ma_period: usize,
  pub ma_value: f64,
  pub breakout_direction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaAlignmentDetails {
  pub ma_20: f64,
  pub ma_50: f64,
  pub ma_200: f64,
  pub alignment: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_signal_kind_strings() {
    assert_eq!(SignalKind::Buy.as_str(), "buy");
    assert_eq!(SignalKind::Sell.as_str(), "sell");
    assert_eq!(SignalKind::Pullback.as_str(), "pullback");
    assert_eq!(SignalKind::Approaching.as_str(), "approaching");
    assert_eq!(SignalKind::Hold.as_str(), "hold");
  }

  #[test]
  fn test_family_name_sets_are_disjoint() {
    let trend = StrategyFamily::Trendline.strategy_names();
    let ma = StrategyFamily::MovingAverage.strategy_names();

    assert_eq!(trend.len(), 3);
    assert_eq!(ma.len(), 8);
    for name in trend {
      assert!(!ma.contains(name));
    }
  }

  #[test]
  fn test_approaching_details_roundtrip() {
    let details = ApproachingDetails {
      trendline_slope: -0.5,
      trendline_intercept: 100.0,
      bar_index: 55,
      distance_pct: 2.1,
      rsi_14: Some(61.3),
      breakout_confirmed: None,
      breakout_date: None,
    };

    let value = serde_json::to_value(&details).unwrap();
    assert!(value.get("breakout_confirmed").unwrap().is_null());

    let back: ApproachingDetails = serde_json::from_value(value).unwrap();
    assert_eq!(back, details);
  }

  #[test]
  fn test_approaching_details_tolerates_missing_rsi() {
    // Stored details without the momentum field must still parse
    let value = serde_json::json!({
      "trendline_slope": -0.5,
      "trendline_intercept": 100.0,
      "bar_index": 55,
      "distance_pct": 2.1,
      "breakout_confirmed": null,
      "breakout_date": null
    });

    let details: ApproachingDetails = serde_json::from_value(value).unwrap();
    assert_eq!(details.rsi_14, None);
  }
}
