//! End-to-end strategy scenarios over synthetic series: a descending
//! trendline forms, price approaches it, and a later session confirms or
//! refutes the breakout.

use chrono::NaiveDate;
use kis_analysis::{
  ApproachingDetails, Bar, Series, SignalKind, Strategy, TrendlineBreakoutStrategy,
  confirm_approaching, names,
};

fn day(n: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(n as i64)
}

fn bar(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Bar {
  Bar { date, open, high, low, close, volume: 10_000 }
}

/// Flat 80-close tape with swing highs at bars 10/25/40 priced 100/95/90.
/// The fitted descending line is y = -x/3 + 103.33.
fn base_bars(n: u32) -> Vec<Bar> {
  let mut bars: Vec<Bar> = (0..n).map(|i| bar(day(i), 80.0, 82.0, 78.0, 80.0)).collect();
  bars[10].high = 100.0;
  bars[25].high = 95.0;
  bars[40].high = 90.0;
  bars
}

fn trendline_value(index: f64) -> f64 {
  -index / 3.0 + 103.0 + 1.0 / 3.0
}

#[test]
fn breakout_emitted_when_close_crosses_the_line() {
  let mut bars = base_bars(60);
  bars[50].close = 92.0;
  bars[50].high = 93.0;

  let series = Series::new(bars).unwrap();
  let emissions = TrendlineBreakoutStrategy::default().analyze(&series);

  let breakouts: Vec<_> = emissions
    .iter()
    .filter(|e| e.strategy_name == names::DESCENDING_TRENDLINE_BREAKOUT)
    .collect();

  assert_eq!(breakouts.len(), 1);
  assert_eq!(breakouts[0].date, day(50));
  assert_eq!(breakouts[0].kind, SignalKind::Buy);
}

#[test]
fn approaching_signal_confirmed_two_sessions_later() {
  // First analysis run: the last bar closes just under the line on a green
  // candle, producing an unresolved approaching signal.
  let mut bars = base_bars(60);
  bars[59].open = 82.0;
  bars[59].close = 83.2;
  bars[59].high = 83.4;

  let series = Series::new(bars.clone()).unwrap();
  let emissions = TrendlineBreakoutStrategy::default().analyze(&series);

  let approaching: Vec<_> = emissions
    .iter()
    .filter(|e| e.strategy_name == names::APPROACHING_BREAKOUT)
    .collect();
  assert_eq!(approaching.len(), 1);
  assert_eq!(approaching[0].date, day(59));

  let details: ApproachingDetails =
    serde_json::from_value(approaching[0].details.clone()).unwrap();
  assert_eq!(details.breakout_confirmed, None);
  assert_eq!(details.bar_index, 59);

  // Two sessions later the high pierces the line.
  let mut extended = bars;
  let pierce = trendline_value(60.0) + 1.5;
  extended.push(bar(day(60), 83.0, pierce, 82.5, 84.0));
  extended.push(bar(day(61), 84.0, 84.2, 83.0, 83.8));
  let extended_series = Series::new(extended).unwrap();

  // The next run resolves the stored signal before recomputing.
  let bars_after = extended_series.bars_after(day(59));
  let outcome = confirm_approaching(
    details.trendline_slope,
    details.trendline_intercept,
    details.bar_index,
    bars_after,
    3,
  )
  .unwrap();

  assert!(outcome.confirmed);
  assert_eq!(outcome.breakout_date, Some(day(60)));

  // And the recomputation emits the actual breakout for that day.
  let second_run = TrendlineBreakoutStrategy::default().analyze(&extended_series);
  let breakouts: Vec<_> = second_run
    .iter()
    .filter(|e| e.strategy_name == names::DESCENDING_TRENDLINE_BREAKOUT)
    .collect();

  assert_eq!(breakouts.len(), 1);
  assert_eq!(breakouts[0].date, day(60));
}

#[test]
fn approaching_signal_refuted_after_three_flat_sessions() {
  let mut bars = base_bars(60);
  bars[59].open = 82.0;
  bars[59].close = 83.2;
  bars[59].high = 83.4;

  let series = Series::new(bars.clone()).unwrap();
  let emissions = TrendlineBreakoutStrategy::default().analyze(&series);
  let approaching = emissions
    .iter()
    .find(|e| e.strategy_name == names::APPROACHING_BREAKOUT)
    .expect("approaching signal");
  let details: ApproachingDetails =
    serde_json::from_value(approaching.details.clone()).unwrap();

  // Three more sessions that never reach the line.
  let mut extended = bars;
  for i in 60..63 {
    extended.push(bar(day(i), 80.0, 81.0, 79.0, 80.0));
  }
  let extended_series = Series::new(extended).unwrap();

  let outcome = confirm_approaching(
    details.trendline_slope,
    details.trendline_intercept,
    details.bar_index,
    extended_series.bars_after(day(59)),
    3,
  )
  .unwrap();

  assert!(!outcome.confirmed);
  assert_eq!(outcome.breakout_date, None);
}
