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

//! # kis-analysis
//!
//! Pure technical-analysis primitives over an immutable OHLCV [`Series`]:
//! rolling indicators, swing-point detection, trendline fitting, and the two
//! strategy families that materialize buy/sell signals. No I/O lives here.

pub mod indicators;
pub mod series;
pub mod strategies;
pub mod strategy;
pub mod swing;
pub mod trendline;

pub use indicators::{Macd, ema, macd, mean_of_recent, rsi, sma};
pub use series::{Bar, Series, SeriesError};
pub use strategies::{
  ApproachingOutcome, MA_PERIODS, MovingAverageStrategy, TrendlineBreakoutStrategy,
  confirm_approaching,
};
pub use strategy::{
  ApproachingDetails, BreakoutDetails, MaAlignmentDetails, MaBreakoutDetails, MaCrossDetails,
  MaLevelDetails, PullbackDetails, SignalEmission, SignalKind, Strategy, StrategyFamily, names,
};
pub use swing::{DEFAULT_SWING_WINDOW, SwingPoint, lower_highs, swing_highs, swing_lows};
pub use trendline::{Trendline, fit_trendline};
