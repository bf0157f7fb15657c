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

use kis_core::{Config, Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// HTTP transport for KIS API requests.
///
/// Handles the low-level HTTP communication with the broker, including header
/// construction, response parsing and error classification. The transport does
/// NOT retry: transient failures bubble to the caller and the retry path is the
/// collection engine's `retry-failed` operation.
pub struct Transport {
  client: Client,
  app_key: String,
  app_secret: String,
  base_url: String,
}

impl Transport {
  /// Create a new transport instance
  pub fn new(config: &Config) -> Result<Self> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let client = Client::builder()
      .timeout(timeout)
      .user_agent("kis-client/1.0")
      .build()
      .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self {
      client,
      app_key: config.app_key.clone(),
      app_secret: config.app_secret.clone(),
      base_url: config.base_url().to_string(),
    })
  }

  /// Override the base URL (mock servers in tests)
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Get the base URL being used
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// POST client-credentials to a token endpoint
  #[instrument(skip(self, body))]
  pub async fn post_token<T>(&self, path: &str, body: &serde_json::Value) -> Result<T>
  where
    T: DeserializeOwned,
  {
    let url = format!("{}{}", self.base_url, path);
    debug!("Requesting token from {}", url);

    let response = self
      .client
      .post(&url)
      .header("content-type", "application/json")
      .json(body)
      .send()
      .await
      .map_err(|e| Error::Http(format!("Token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
      error!("Token endpoint returned HTTP {}", status);
      return Err(Error::Http(format!("Token endpoint returned HTTP {}", status)));
    }

    response
      .json::<T>()
      .await
      .map_err(|e| Error::Parse(format!("Failed to parse token response: {}", e)))
  }

  /// Execute an authenticated GET against a market-data endpoint.
  ///
  /// HTTP 429 maps to [`Error::RateLimit`]; other non-success statuses map to
  /// [`Error::Http`]. Both are transient per the error taxonomy.
  #[instrument(skip(self, access_token, params), fields(tr_id = %tr_id))]
  pub async fn get<T>(
    &self,
    path: &str,
    tr_id: &str,
    access_token: &str,
    params: &HashMap<&'static str, String>,
  ) -> Result<T>
  where
    T: DeserializeOwned,
  {
    let url = format!("{}{}", self.base_url, path);
    debug!("Making request to: {}", url);

    let response = self
      .client
      .get(&url)
      .header("content-type", "application/json; charset=utf-8")
      .header("authorization", format!("Bearer {}", access_token))
      .header("appkey", &self.app_key)
      .header("appsecret", &self.app_secret)
      .header("tr_id", tr_id)
      .query(params)
      .send()
      .await
      .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
      return Err(Error::RateLimit(format!("HTTP 429 from {}", path)));
    }
    if !status.is_success() {
      error!("HTTP error: {}", status);
      return Err(Error::Http(format!("HTTP error: {}", status)));
    }

    let text = response
      .text()
      .await
      .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))?;

    serde_json::from_str(&text)
      .map_err(|e| Error::Parse(format!("Failed to deserialize response: {}. Raw: {}", e, text)))
  }
}

impl std::fmt::Debug for Transport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Transport")
      .field("base_url", &self.base_url)
      .field("app_key", &"[REDACTED]")
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_config() -> Config {
    Config::default_with_keys("test_key".to_string(), "test_secret".to_string())
  }

  #[test]
  fn test_transport_creation_uses_mock_url() {
    let transport = Transport::new(&test_config()).unwrap();
    assert_eq!(transport.base_url(), kis_core::KIS_MOCK_BASE_URL);
  }

  #[test]
  fn test_transport_base_url_override() {
    let transport =
      Transport::new(&test_config()).unwrap().with_base_url("http://127.0.0.1:9999");
    assert_eq!(transport.base_url(), "http://127.0.0.1:9999");
  }

  #[test]
  fn test_transport_debug_redacts_key() {
    let transport = Transport::new(&test_config()).unwrap();
    let debug_str = format!("{:?}", transport);
    assert!(debug_str.contains("[REDACTED]"));
    assert!(!debug_str.contains("test_key"));
  }
}
