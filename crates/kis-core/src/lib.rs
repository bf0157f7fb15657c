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

//! # kis-core
//!
//! Core types, configuration, and error handling for the KIS market-data engine.
//!
//! This crate provides the foundational components shared across all workspace crates:
//!
//! - [`Config`] - broker credentials, database, and collection settings
//! - [`Error`] and [`Result`] - unified error handling
//! - [`Market`], [`ExchangeCode`], [`Period`] - market identifiers
//!
//! ## Example
//!
//! ```
//! use kis_core::{Config, ExchangeCode};
//!
//! let config = Config::default_with_keys("key".to_string(), "secret".to_string());
//! let exchange = ExchangeCode::from_exchange_name("NASDAQ");
//! assert_eq!(exchange.as_str(), "NAS");
//! ```

pub mod config;
pub mod error;
pub mod types;
pub use config::{CollectionMode, Config};
pub use error::{Error, Result};
pub use types::{ExchangeCode, Market, Period};

/// Live-trading base URL
pub const KIS_REAL_BASE_URL: &str = "https://openapi.koreainvestment.com:9443";

/// Mock-trading base URL
pub const KIS_MOCK_BASE_URL: &str = "https://openapivts.koreainvestment.com:29443";

/// Token validity the broker applies when `expires_in` is absent (24 hours)
pub const TOKEN_DEFAULT_TTL_SECS: i64 = 86_400;

/// Tokens within this margin of expiry are refreshed early
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 300;

/// Hard cap on the per-job worker pool
pub const MAX_WORKERS: usize = 20;

/// A job aborts itself after this much wall time
pub const SOFT_TIME_LIMIT_SECS: u64 = 59 * 60;

/// Minimum stored rows before incremental collection is considered
pub const MIN_HISTORY_RECORDS: i32 = 60;

/// Minimum rows required by the moving-average strategy family
pub const MIN_MA_HISTORY_RECORDS: i32 = 200;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_base_urls() {
    assert!(KIS_REAL_BASE_URL.starts_with("https://"));
    assert!(KIS_MOCK_BASE_URL.starts_with("https://"));
    assert_ne!(KIS_REAL_BASE_URL, KIS_MOCK_BASE_URL);
  }

  #[test]
  fn test_token_constants() {
    assert_eq!(TOKEN_DEFAULT_TTL_SECS, 86_400);
    assert_eq!(TOKEN_EXPIRY_MARGIN_SECS, 300);
  }

  #[test]
  fn test_worker_cap() {
    assert_eq!(MAX_WORKERS, 20);
  }

  #[test]
  fn test_history_thresholds() {
    assert!(MIN_HISTORY_RECORDS < MIN_MA_HISTORY_RECORDS);
    assert_eq!(MIN_HISTORY_RECORDS, 60);
    assert_eq!(MIN_MA_HISTORY_RECORDS, 200);
  }

  #[test]
  fn test_soft_time_limit() {
    assert_eq!(SOFT_TIME_LIMIT_SECS, 3540);
  }
}
