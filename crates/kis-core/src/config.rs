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

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Universe selection mode for collection and analysis jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
  Tagged,
  All,
  Top,
}

impl std::str::FromStr for CollectionMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "tagged" => Ok(CollectionMode::Tagged),
      "all" => Ok(CollectionMode::All),
      "top" => Ok(CollectionMode::Top),
      other => Err(Error::Config(format!("Invalid HISTORY_COLLECTION_MODE: {}", other))),
    }
  }
}

/// Main configuration for the KIS market-data engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// KIS application key
  pub app_key: String,

  /// KIS application secret
  pub app_secret: String,

  /// Account number (8 digits), unused by market-data endpoints
  pub account_number: String,

  /// Account product code (2 digits)
  pub account_code: String,

  /// Mock-trading toggle; selects one of the two hard-coded base URLs
  pub is_mock: bool,

  /// Database connection string
  pub database_url: String,

  /// Optional progress-broadcast / cache layer; absent means in-memory fallback
  pub redis_url: Option<String>,

  /// API rate limit (requests per second)
  pub rate_limit: u32,

  /// Request timeout in seconds
  pub timeout_secs: u64,

  /// Default look-back window for full history collection (days)
  pub history_collection_days: u32,

  /// Default universe selection mode
  pub history_collection_mode: CollectionMode,

  /// Universe size in `top` mode
  pub history_collection_limit: u32,

  /// Worker pool size for collection jobs, clamped to [1, MAX_WORKERS]
  pub history_collection_workers: usize,

  /// Whether the scheduler installs cron jobs on startup
  pub enable_auto_history_collection: bool,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let app_key = env::var("KIS_APP_KEY")
      .map_err(|_| Error::MissingCredentials("KIS_APP_KEY not set".to_string()))?;
    let app_secret = env::var("KIS_APP_SECRET")
      .map_err(|_| Error::MissingCredentials("KIS_APP_SECRET not set".to_string()))?;

    let account_number = env::var("KIS_ACCOUNT_NUMBER").unwrap_or_default();
    let account_code = env::var("KIS_ACCOUNT_CODE").unwrap_or_default();

    let is_mock = env::var("KIS_IS_MOCK")
      .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
      .unwrap_or(true);

    let database_url =
      env::var("DATABASE_URL").map_err(|_| Error::Config("DATABASE_URL not set".to_string()))?;

    let redis_url = env::var("REDIS_URL").ok().filter(|v| !v.is_empty());

    let rate_limit = env::var("KIS_RATE_LIMIT")
      .unwrap_or_else(|_| "15".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid KIS_RATE_LIMIT".to_string()))?;

    let timeout_secs = env::var("KIS_TIMEOUT_SECS")
      .unwrap_or_else(|_| "30".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid KIS_TIMEOUT_SECS".to_string()))?;

    let history_collection_days = env::var("HISTORY_COLLECTION_DAYS")
      .unwrap_or_else(|_| "100".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid HISTORY_COLLECTION_DAYS".to_string()))?;

    let history_collection_mode = env::var("HISTORY_COLLECTION_MODE")
      .unwrap_or_else(|_| "all".to_string())
      .parse()?;

    let history_collection_limit = env::var("HISTORY_COLLECTION_LIMIT")
      .unwrap_or_else(|_| "500".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid HISTORY_COLLECTION_LIMIT".to_string()))?;

    let history_collection_workers: usize = env::var("HISTORY_COLLECTION_WORKERS")
      .unwrap_or_else(|_| "5".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid HISTORY_COLLECTION_WORKERS".to_string()))?;
    let history_collection_workers = history_collection_workers.clamp(1, crate::MAX_WORKERS);

    let enable_auto_history_collection = env::var("ENABLE_AUTO_HISTORY_COLLECTION")
      .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
      .unwrap_or(false);

    Ok(Config {
      app_key,
      app_secret,
      account_number,
      account_code,
      is_mock,
      database_url,
      redis_url,
      rate_limit,
      timeout_secs,
      history_collection_days,
      history_collection_mode,
      history_collection_limit,
      history_collection_workers,
      enable_auto_history_collection,
    })
  }

  /// The broker base URL selected by the mock toggle
  pub fn base_url(&self) -> &'static str {
    if self.is_mock {
      crate::KIS_MOCK_BASE_URL
    } else {
      crate::KIS_REAL_BASE_URL
    }
  }

  /// Create a config with default values (for testing)
  pub fn default_with_keys(app_key: String, app_secret: String) -> Self {
    Config {
      app_key,
      app_secret,
      account_number: String::new(),
      account_code: String::new(),
      is_mock: true,
      database_url: String::new(),
      redis_url: None,
      rate_limit: 15,
      timeout_secs: 30,
      history_collection_days: 100,
      history_collection_mode: CollectionMode::All,
      history_collection_limit: 500,
      history_collection_workers: 5,
      enable_auto_history_collection: false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_collection_mode_from_str() {
    assert_eq!("tagged".parse::<CollectionMode>().unwrap(), CollectionMode::Tagged);
    assert_eq!("ALL".parse::<CollectionMode>().unwrap(), CollectionMode::All);
    assert_eq!("top".parse::<CollectionMode>().unwrap(), CollectionMode::Top);
    assert!("bogus".parse::<CollectionMode>().is_err());
  }

  #[test]
  fn test_default_config_base_url() {
    let config = Config::default_with_keys("key".to_string(), "secret".to_string());
    assert_eq!(config.base_url(), crate::KIS_MOCK_BASE_URL);

    let live = Config { is_mock: false, ..config };
    assert_eq!(live.base_url(), crate::KIS_REAL_BASE_URL);
  }

  #[test]
  fn test_default_config_values() {
    let config = Config::default_with_keys("key".to_string(), "secret".to_string());
    assert_eq!(config.rate_limit, 15);
    assert_eq!(config.history_collection_days, 100);
    assert_eq!(config.history_collection_workers, 5);
    assert_eq!(config.history_collection_mode, CollectionMode::All);
  }
}
