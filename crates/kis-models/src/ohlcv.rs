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

//! OHLCV response models for the domestic and overseas chart endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Generic KIS response envelope.
///
/// Every endpoint reports success through a top-level `rt_cd == "0"`; on
/// failure `msg1` carries the broker's message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KisResponse<T> {
  #[serde(default)]
  pub rt_cd: String,

  #[serde(default)]
  pub msg1: String,

  #[serde(default = "Vec::new")]
  pub output2: Vec<T>,
}

impl<T> KisResponse<T> {
  pub fn is_success(&self) -> bool {
    self.rt_cd == "0"
  }
}

/// Single-record quote envelope used by the current-price endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteOutput {
  #[serde(default)]
  pub rt_cd: String,

  #[serde(default)]
  pub msg1: String,

  #[serde(default)]
  pub output: serde_json::Value,
}

impl QuoteOutput {
  pub fn is_success(&self) -> bool {
    self.rt_cd == "0"
  }

  /// Pull a price field out of the opaque quote payload
  pub fn price_field(&self, field: &str) -> Option<f64> {
    self.output.get(field).and_then(|v| v.as_str()).and_then(|s| s.parse::<f64>().ok())
  }
}

/// Domestic (KR) daily chart record; prices are integer strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KrDailyPrice {
  #[serde(default)]
  pub stck_bsop_date: String,

  #[serde(default)]
  pub stck_oprc: String,

  #[serde(default)]
  pub stck_hgpr: String,

  #[serde(default)]
  pub stck_lwpr: String,

  #[serde(default)]
  pub stck_clpr: String,

  #[serde(default)]
  pub acml_vol: String,
}

/// Overseas (US) daily chart record; prices are decimal strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsDailyPrice {
  #[serde(default)]
  pub xymd: String,

  #[serde(default)]
  pub open: String,

  #[serde(default)]
  pub high: String,

  #[serde(default)]
  pub low: String,

  #[serde(default)]
  pub clos: String,

  #[serde(default)]
  pub tvol: String,
}

/// A parsed OHLCV bar in broker-returned order, prior to validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
  pub date: NaiveDate,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
  pub volume: i64,
}

/// Parse a price field defensively: empty → 0, non-numeric → None (skip row)
fn parse_price(raw: &str) -> Option<f64> {
  if raw.is_empty() {
    return Some(0.0);
  }
  raw.parse::<f64>().ok()
}

fn parse_volume(raw: &str) -> Option<i64> {
  if raw.is_empty() {
    return Some(0);
  }
  raw.parse::<f64>().ok().map(|v| v as i64)
}

impl KrDailyPrice {
  /// Convert a wire record into a [`RawBar`].
  ///
  /// Rows with an unparseable date or a non-numeric price are skipped with a
  /// warning, matching the defensive numeric contract of the upstream API.
  pub fn to_raw_bar(&self) -> Option<RawBar> {
    let date = match NaiveDate::parse_from_str(&self.stck_bsop_date, "%Y%m%d") {
      Ok(d) => d,
      Err(e) => {
        warn!("Skipping KR row with bad date {:?}: {}", self.stck_bsop_date, e);
        return None;
      }
    };

    let open = parse_price(&self.stck_oprc)?;
    let high = parse_price(&self.stck_hgpr)?;
    let low = parse_price(&self.stck_lwpr)?;
    let close = parse_price(&self.stck_clpr)?;
    let volume = parse_volume(&self.acml_vol)?;

    Some(RawBar { date, open, high, low, close, volume })
  }
}

impl UsDailyPrice {
  pub fn to_raw_bar(&self) -> Option<RawBar> {
    let date = match NaiveDate::parse_from_str(&self.xymd, "%Y%m%d") {
      Ok(d) => d,
      Err(e) => {
        warn!("Skipping US row with bad date {:?}: {}", self.xymd, e);
        return None;
      }
    };

    let open = parse_price(&self.open)?;
    let high = parse_price(&self.high)?;
    let low = parse_price(&self.low)?;
    let close = parse_price(&self.clos)?;
    let volume = parse_volume(&self.tvol)?;

    Some(RawBar { date, open, high, low, close, volume })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_kis_response_success_marker() {
    let json = r#"{"rt_cd":"0","msg1":"OK","output2":[]}"#;
    let resp: KisResponse<KrDailyPrice> = serde_json::from_str(json).unwrap();
    assert!(resp.is_success());

    let json = r#"{"rt_cd":"1","msg1":"Invalid symbol","output2":[]}"#;
    let resp: KisResponse<KrDailyPrice> = serde_json::from_str(json).unwrap();
    assert!(!resp.is_success());
    assert_eq!(resp.msg1, "Invalid symbol");
  }

  #[test]
  fn test_kis_response_missing_output_defaults_empty() {
    let json = r#"{"rt_cd":"0","msg1":"OK"}"#;
    let resp: KisResponse<UsDailyPrice> = serde_json::from_str(json).unwrap();
    assert!(resp.output2.is_empty());
  }

  #[test]
  fn test_kr_daily_price_to_raw_bar() {
    let row = KrDailyPrice {
      stck_bsop_date: "20240115".to_string(),
      stck_oprc: "71000".to_string(),
      stck_hgpr: "72500".to_string(),
      stck_lwpr: "70800".to_string(),
      stck_clpr: "72100".to_string(),
      acml_vol: "13456789".to_string(),
    };

    let bar = row.to_raw_bar().unwrap();
    assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(bar.open, 71_000.0);
    assert_eq!(bar.high, 72_500.0);
    assert_eq!(bar.low, 70_800.0);
    assert_eq!(bar.close, 72_100.0);
    assert_eq!(bar.volume, 13_456_789);
  }

  #[test]
  fn test_kr_daily_price_missing_field_is_zero() {
    let row = KrDailyPrice {
      stck_bsop_date: "20240115".to_string(),
      stck_oprc: String::new(),
      stck_hgpr: "72500".to_string(),
      stck_lwpr: "70800".to_string(),
      stck_clpr: "72100".to_string(),
      acml_vol: String::new(),
    };

    let bar = row.to_raw_bar().unwrap();
    assert_eq!(bar.open, 0.0);
    assert_eq!(bar.volume, 0);
  }

  #[test]
  fn test_kr_daily_price_non_numeric_skips_row() {
    let row = KrDailyPrice {
      stck_bsop_date: "20240115".to_string(),
      stck_oprc: "garbage".to_string(),
      stck_hgpr: "72500".to_string(),
      stck_lwpr: "70800".to_string(),
      stck_clpr: "72100".to_string(),
      acml_vol: "0".to_string(),
    };

    assert!(row.to_raw_bar().is_none());
  }

  #[test]
  fn test_kr_daily_price_bad_date_skips_row() {
    let row = KrDailyPrice {
      stck_bsop_date: "2024-01-15".to_string(),
      stck_oprc: "71000".to_string(),
      stck_hgpr: "72500".to_string(),
      stck_lwpr: "70800".to_string(),
      stck_clpr: "72100".to_string(),
      acml_vol: "100".to_string(),
    };

    assert!(row.to_raw_bar().is_none());
  }

  #[test]
  fn test_us_daily_price_decimal_strings() {
    let row = UsDailyPrice {
      xymd: "20240116".to_string(),
      open: "185.50".to_string(),
      high: "187.25".to_string(),
      low: "184.10".to_string(),
      clos: "186.75".to_string(),
      tvol: "54321000".to_string(),
    };

    let bar = row.to_raw_bar().unwrap();
    assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    assert!((bar.open - 185.50).abs() < f64::EPSILON);
    assert!((bar.close - 186.75).abs() < f64::EPSILON);
    assert_eq!(bar.volume, 54_321_000);
  }

  #[test]
  fn test_quote_output_price_field() {
    let json = r#"{"rt_cd":"0","msg1":"OK","output":{"stck_prpr":"72100"}}"#;
    let quote: QuoteOutput = serde_json::from_str(json).unwrap();
    assert!(quote.is_success());
    assert_eq!(quote.price_field("stck_prpr"), Some(72_100.0));
    assert_eq!(quote.price_field("missing"), None);
  }
}
