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

//! Market, exchange and period identifiers shared across the workspace.

use serde::{Deserialize, Serialize};

/// Markets served by the broker's two OHLCV endpoint families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
  Kr,
  Us,
}

impl Market {
  pub fn as_str(&self) -> &'static str {
    match self {
      Market::Kr => "KR",
      Market::Us => "US",
    }
  }

  /// Parse the stored market column; unknown values are rejected
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_uppercase().as_str() {
      "KR" => Some(Market::Kr),
      "US" => Some(Market::Us),
      _ => None,
    }
  }
}

impl std::fmt::Display for Market {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Overseas exchange codes understood by the broker API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeCode {
  Nas,
  Nys,
  Ams,
}

impl ExchangeCode {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExchangeCode::Nas => "NAS",
      ExchangeCode::Nys => "NYS",
      ExchangeCode::Ams => "AMS",
    }
  }

  /// Map a stored exchange name to the broker's code.
  /// Unknown names default to NAS.
  pub fn from_exchange_name(name: &str) -> Self {
    match name.to_uppercase().as_str() {
      "NASDAQ" | "NAS" => ExchangeCode::Nas,
      "NYSE" | "NYS" => ExchangeCode::Nys,
      "AMEX" | "AMS" => ExchangeCode::Ams,
      _ => ExchangeCode::Nas,
    }
  }
}

impl std::fmt::Display for ExchangeCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Candle period for OHLCV queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
  Day,
  Week,
  Month,
}

impl Period {
  /// Wire code shared by the domestic and overseas chart endpoints
  pub fn wire_code(&self) -> &'static str {
    match self {
      Period::Day => "D",
      Period::Week => "W",
      Period::Month => "M",
    }
  }
}

impl std::fmt::Display for Period {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.wire_code())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_market_roundtrip() {
    assert_eq!(Market::parse("KR"), Some(Market::Kr));
    assert_eq!(Market::parse("us"), Some(Market::Us));
    assert_eq!(Market::parse("JP"), None);
    assert_eq!(Market::Kr.as_str(), "KR");
    assert_eq!(Market::Us.to_string(), "US");
  }

  #[test]
  fn test_exchange_code_mapping() {
    assert_eq!(ExchangeCode::from_exchange_name("NASDAQ"), ExchangeCode::Nas);
    assert_eq!(ExchangeCode::from_exchange_name("NYSE"), ExchangeCode::Nys);
    assert_eq!(ExchangeCode::from_exchange_name("AMEX"), ExchangeCode::Ams);
    assert_eq!(ExchangeCode::from_exchange_name("nyse"), ExchangeCode::Nys);
  }

  #[test]
  fn test_exchange_code_unknown_defaults_to_nas() {
    assert_eq!(ExchangeCode::from_exchange_name("LSE"), ExchangeCode::Nas);
    assert_eq!(ExchangeCode::from_exchange_name(""), ExchangeCode::Nas);
  }

  #[test]
  fn test_period_wire_codes() {
    assert_eq!(Period::Day.wire_code(), "D");
    assert_eq!(Period::Week.wire_code(), "W");
    assert_eq!(Period::Month.wire_code(), "M");
  }
}
