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

use crate::token::{TokenCacheStore, TokenManager};
use crate::transport::Transport;
use chrono::NaiveDate;
use governor::{
  Quota, RateLimiter,
  clock::DefaultClock,
  middleware::NoOpMiddleware,
  state::{InMemoryState, NotKeyed},
};
use kis_core::{Config, Error, ExchangeCode, Period, Result};
use kis_models::{KisResponse, KrDailyPrice, QuoteOutput, RawBar, UsDailyPrice};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, info};

const KR_OHLCV_PATH: &str = "/uapi/domestic-stock/v1/quotations/inquire-daily-itemchartprice";
const KR_OHLCV_TR_ID: &str = "FHKST03010100";
const KR_PRICE_PATH: &str = "/uapi/domestic-stock/v1/quotations/inquire-price";
const KR_PRICE_TR_ID: &str = "FHKST01010100";
const US_OHLCV_PATH: &str = "/uapi/overseas-price/v1/quotations/dailyprice";
const US_OHLCV_TR_ID: &str = "HHDFS76240000";
const US_PRICE_PATH: &str = "/uapi/overseas-price/v1/quotations/price";
const US_PRICE_TR_ID: &str = "HHDFS00000300";

/// Authenticated OHLCV and quote client for the KIS Open API.
///
/// Covers the domestic (KR) and overseas (US) endpoint families, amortizing
/// token issuance through [`TokenManager`] and pacing requests with a
/// rate limiter. The client never retries; transient failures are handled at
/// the collection-engine boundary.
///
/// # Examples
///
/// ```ignore
/// use kis_client::KisClient;
/// use kis_core::{Config, ExchangeCode, Period};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::from_env()?;
///     let client = KisClient::new(&config)?;
///
///     let bars = client.get_us_ohlcv("AAPL", ExchangeCode::Nas, Period::Day).await?;
///     println!("{} bars", bars.len());
///     Ok(())
/// }
/// ```
pub struct KisClient {
  transport: Transport,
  tokens: TokenManager,
  rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl KisClient {
  /// Create a new KIS API client
  pub fn new(config: &Config) -> Result<Self> {
    if config.app_key.is_empty() || config.app_secret.is_empty() {
      return Err(Error::MissingCredentials("KIS_APP_KEY / KIS_APP_SECRET".to_string()));
    }

    let rate_limit = NonZeroU32::new(config.rate_limit)
      .unwrap_or_else(|| NonZeroU32::new(15).expect("default rate limit must be non-zero"));
    let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate_limit)));

    let transport = Transport::new(config)?;
    let tokens =
      TokenManager::new(config.app_key.clone(), config.app_secret.clone(), config.is_mock);

    Ok(Self { transport, tokens, rate_limiter })
  }

  /// Attach a persistent token cache
  pub fn with_token_store(mut self, store: Box<dyn TokenCacheStore>) -> Self {
    self.tokens = self.tokens.with_store(store);
    self
  }

  /// Point the client at a different base URL (mock servers in tests)
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.transport = self.transport.with_base_url(base_url);
    self
  }

  async fn bearer(&self) -> Result<String> {
    self.rate_limiter.until_ready().await;
    self.tokens.ensure_token(&self.transport).await
  }

  /// Fetch domestic daily/weekly/monthly OHLCV for `[start, end]`.
  ///
  /// Returns bars sorted ascending by date; the broker responds most-recent
  /// first.
  pub async fn get_kr_ohlcv(
    &self,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    period: Period,
  ) -> Result<Vec<RawBar>> {
    let token = self.bearer().await?;

    let mut params: HashMap<&'static str, String> = HashMap::new();
    params.insert("FID_COND_MRKT_DIV_CODE", "J".to_string());
    params.insert("FID_INPUT_ISCD", symbol.to_string());
    params.insert("FID_INPUT_DATE_1", start.format("%Y%m%d").to_string());
    params.insert("FID_INPUT_DATE_2", end.format("%Y%m%d").to_string());
    params.insert("FID_PERIOD_DIV_CODE", period.wire_code().to_string());
    params.insert("FID_ORG_ADJ_PRC", "0".to_string());

    let response: KisResponse<KrDailyPrice> =
      self.transport.get(KR_OHLCV_PATH, KR_OHLCV_TR_ID, &token, &params).await?;

    if !response.is_success() {
      return Err(Error::UpstreamRejected { code: response.rt_cd, msg: response.msg1 });
    }

    let mut bars: Vec<RawBar> =
      response.output2.iter().filter_map(KrDailyPrice::to_raw_bar).collect();
    bars.sort_by_key(|b| b.date);

    info!("Fetched {} OHLCV records for {}", bars.len(), symbol);
    Ok(bars)
  }

  /// Fetch overseas daily/weekly/monthly OHLCV.
  ///
  /// The overseas endpoint takes no date range; it returns the most recent
  /// window for the requested period.
  pub async fn get_us_ohlcv(
    &self,
    symbol: &str,
    exchange: ExchangeCode,
    period: Period,
  ) -> Result<Vec<RawBar>> {
    let token = self.bearer().await?;

    let mut params: HashMap<&'static str, String> = HashMap::new();
    params.insert("AUTH", String::new());
    params.insert("EXCD", exchange.as_str().to_string());
    params.insert("SYMB", symbol.to_string());
    params.insert("GUBN", period.wire_code().to_string());
    params.insert("BYMD", String::new());
    params.insert("MODP", "0".to_string());

    let response: KisResponse<UsDailyPrice> =
      self.transport.get(US_OHLCV_PATH, US_OHLCV_TR_ID, &token, &params).await?;

    if !response.is_success() {
      return Err(Error::UpstreamRejected { code: response.rt_cd, msg: response.msg1 });
    }

    let mut bars: Vec<RawBar> =
      response.output2.iter().filter_map(UsDailyPrice::to_raw_bar).collect();
    bars.sort_by_key(|b| b.date);

    info!("Fetched {} OHLCV records for {} ({})", bars.len(), symbol, exchange);
    Ok(bars)
  }

  /// Current domestic quote; `None` when the broker omits the price field
  pub async fn get_kr_price(&self, symbol: &str) -> Result<Option<f64>> {
    let token = self.bearer().await?;

    let mut params: HashMap<&'static str, String> = HashMap::new();
    params.insert("FID_COND_MRKT_DIV_CODE", "J".to_string());
    params.insert("FID_INPUT_ISCD", symbol.to_string());

    let quote: QuoteOutput =
      self.transport.get(KR_PRICE_PATH, KR_PRICE_TR_ID, &token, &params).await?;

    if !quote.is_success() {
      return Err(Error::UpstreamRejected { code: quote.rt_cd, msg: quote.msg1 });
    }

    debug!("Fetched KR quote for {}", symbol);
    Ok(quote.price_field("stck_prpr"))
  }

  /// Current overseas quote
  pub async fn get_us_price(&self, symbol: &str, exchange: ExchangeCode) -> Result<Option<f64>> {
    let token = self.bearer().await?;

    let mut params: HashMap<&'static str, String> = HashMap::new();
    params.insert("AUTH", String::new());
    params.insert("EXCD", exchange.as_str().to_string());
    params.insert("SYMB", symbol.to_string());

    let quote: QuoteOutput =
      self.transport.get(US_PRICE_PATH, US_PRICE_TR_ID, &token, &params).await?;

    if !quote.is_success() {
      return Err(Error::UpstreamRejected { code: quote.rt_cd, msg: quote.msg1 });
    }

    debug!("Fetched US quote for {} ({})", symbol, exchange);
    Ok(quote.price_field("last"))
  }
}

impl std::fmt::Debug for KisClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("KisClient")
      .field("transport", &self.transport)
      .field("rate_limiter", &"RateLimiter")
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{header, method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn test_config() -> Config {
    Config::default_with_keys("test_key".to_string(), "test_secret".to_string())
  }

  async fn mock_token(server: &MockServer) {
    Mock::given(method("POST"))
      .and(path("/oauth2/tokenP"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "test-token",
        "expires_in": 86400
      })))
      .mount(server)
      .await;
  }

  #[test]
  fn test_client_requires_credentials() {
    let config = Config::default_with_keys(String::new(), String::new());
    assert!(matches!(KisClient::new(&config), Err(Error::MissingCredentials(_))));
  }

  #[tokio::test]
  async fn test_kr_ohlcv_fetch_and_sort() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    // Broker returns most-recent first; the client sorts ascending
    Mock::given(method("GET"))
      .and(path(KR_OHLCV_PATH))
      .and(header("tr_id", KR_OHLCV_TR_ID))
      .and(header("authorization", "Bearer test-token"))
      .and(query_param("FID_INPUT_ISCD", "005930"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "rt_cd": "0",
        "msg1": "OK",
        "output2": [
          {"stck_bsop_date": "20240116", "stck_oprc": "72000", "stck_hgpr": "73000",
           "stck_lwpr": "71500", "stck_clpr": "72800", "acml_vol": "1000"},
          {"stck_bsop_date": "20240115", "stck_oprc": "71000", "stck_hgpr": "72500",
           "stck_lwpr": "70800", "stck_clpr": "72100", "acml_vol": "900"}
        ]
      })))
      .mount(&server)
      .await;

    let client = KisClient::new(&test_config()).unwrap().with_base_url(server.uri());

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
    let bars = client.get_kr_ohlcv("005930", start, end, Period::Day).await.unwrap();

    assert_eq!(bars.len(), 2);
    assert!(bars[0].date < bars[1].date);
    assert_eq!(bars[0].close, 72_100.0);
    assert_eq!(bars[1].close, 72_800.0);
  }

  #[tokio::test]
  async fn test_us_ohlcv_upstream_rejection() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
      .and(path(US_OHLCV_PATH))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "rt_cd": "1",
        "msg1": "Invalid symbol",
        "output2": []
      })))
      .mount(&server)
      .await;

    let client = KisClient::new(&test_config()).unwrap().with_base_url(server.uri());

    let err =
      client.get_us_ohlcv("BOGUS", ExchangeCode::Nas, Period::Day).await.unwrap_err();
    match err {
      Error::UpstreamRejected { code, msg } => {
        assert_eq!(code, "1");
        assert_eq!(msg, "Invalid symbol");
      }
      other => panic!("expected UpstreamRejected, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_rate_limit_status_maps_to_rate_limit_error() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
      .and(path(KR_OHLCV_PATH))
      .respond_with(ResponseTemplate::new(429))
      .mount(&server)
      .await;

    let client = KisClient::new(&test_config()).unwrap().with_base_url(server.uri());

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
    let err = client.get_kr_ohlcv("005930", start, end, Period::Day).await.unwrap_err();
    assert!(matches!(err, Error::RateLimit(_)));
    assert!(err.is_transient());
  }

  #[tokio::test]
  async fn test_us_price_quote() {
    let server = MockServer::start().await;
    mock_token(&server).await;

    Mock::given(method("GET"))
      .and(path(US_PRICE_PATH))
      .and(header("tr_id", US_PRICE_TR_ID))
      .and(query_param("EXCD", "NAS"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "rt_cd": "0",
        "msg1": "OK",
        "output": {"last": "186.75"}
      })))
      .mount(&server)
      .await;

    let client = KisClient::new(&test_config()).unwrap().with_base_url(server.uri());

    let price = client.get_us_price("AAPL", ExchangeCode::Nas).await.unwrap();
    assert_eq!(price, Some(186.75));
  }

  #[tokio::test]
  async fn test_token_issued_once_across_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
      .and(path("/oauth2/tokenP"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "access_token": "test-token",
        "expires_in": 86400
      })))
      .expect(1)
      .mount(&server)
      .await;

    Mock::given(method("GET"))
      .and(path(KR_PRICE_PATH))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "rt_cd": "0",
        "msg1": "OK",
        "output": {"stck_prpr": "72100"}
      })))
      .mount(&server)
      .await;

    let client = KisClient::new(&test_config()).unwrap().with_base_url(server.uri());

    for _ in 0..3 {
      let price = client.get_kr_price("005930").await.unwrap();
      assert_eq!(price, Some(72_100.0));
    }
  }
}
