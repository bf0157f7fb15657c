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

//! Access-token lifecycle for the KIS API.
//!
//! Tokens are valid for 24 hours. The manager keeps one in process, falls back
//! to a persistent cache across restarts, and only then issues a fresh token.
//! Concurrent issuance races are harmless: the cache upsert is last-writer-wins
//! and subsequent readers find a valid token.

use crate::transport::Transport;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use kis_core::{Error, Result, TOKEN_DEFAULT_TTL_SECS, TOKEN_EXPIRY_MARGIN_SECS};
use kis_models::TokenResponse;
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Provider key under which KIS tokens are cached
pub const TOKEN_PROVIDER: &str = "kis";

/// A bearer token with its expiry
#[derive(Debug, Clone)]
pub struct CachedToken {
  pub access_token: String,
  pub expired_at: DateTime<Utc>,
}

impl CachedToken {
  /// Tokens are treated as expired within the early-refresh margin
  pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
    now < self.expired_at - Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS)
  }
}

/// Narrow persistence interface for token caching.
///
/// Implemented over the `token_cache` table; an in-memory implementation
/// serves tests and cache-less deployments.
#[async_trait]
pub trait TokenCacheStore: Send + Sync {
  async fn load(&self, provider: &str, cache_key: &str) -> Result<Option<CachedToken>>;

  async fn save(&self, provider: &str, cache_key: &str, token: &CachedToken) -> Result<()>;
}

/// Derive the cache key distinguishing credential sets and mock/live targets
pub fn token_cache_key(app_key: &str, is_mock: bool) -> String {
  let mut hasher = DefaultHasher::new();
  app_key.hash(&mut hasher);
  is_mock.hash(&mut hasher);
  format!("{:016x}", hasher.finish())
}

/// Manages the in-process token and its persistent cache
pub struct TokenManager {
  app_key: String,
  app_secret: String,
  is_mock: bool,
  cache_key: String,
  current: Mutex<Option<CachedToken>>,
  store: Option<Box<dyn TokenCacheStore>>,
}

impl TokenManager {
  pub fn new(app_key: String, app_secret: String, is_mock: bool) -> Self {
    let cache_key = token_cache_key(&app_key, is_mock);
    Self { app_key, app_secret, is_mock, cache_key, current: Mutex::new(None), store: None }
  }

  pub fn with_store(mut self, store: Box<dyn TokenCacheStore>) -> Self {
    self.store = Some(store);
    self
  }

  /// Mock trading uses a separate token endpoint
  fn token_path(&self) -> &'static str {
    if self.is_mock {
      "/oauth2/tokenP"
    } else {
      "/oauth2/token"
    }
  }

  /// Return a usable bearer token, refreshing through the cache or the token
  /// endpoint as needed.
  pub async fn ensure_token(&self, transport: &Transport) -> Result<String> {
    let now = Utc::now();
    let mut current = self.current.lock().await;

    if let Some(token) = current.as_ref() {
      if token.is_usable(now) {
        return Ok(token.access_token.clone());
      }
      debug!("In-process token expired or expiring soon");
    }

    // Fall back to the persistent cache before issuing a new token
    if let Some(store) = &self.store {
      match store.load(TOKEN_PROVIDER, &self.cache_key).await {
        Ok(Some(cached)) if cached.is_usable(now) => {
          info!("Adopted cached KIS token (expires at {})", cached.expired_at);
          let access_token = cached.access_token.clone();
          *current = Some(cached);
          return Ok(access_token);
        }
        Ok(_) => debug!("No usable cached token for key {}", self.cache_key),
        Err(e) => warn!("Failed to load cached token: {}", e),
      }
    }

    let token = self.issue_token(transport).await?;
    let access_token = token.access_token.clone();

    if let Some(store) = &self.store {
      if let Err(e) = store.save(TOKEN_PROVIDER, &self.cache_key, &token).await {
        warn!("Failed to persist token cache: {}", e);
      }
    }

    *current = Some(token);
    Ok(access_token)
  }

  async fn issue_token(&self, transport: &Transport) -> Result<CachedToken> {
    let body = json!({
      "grant_type": "client_credentials",
      "appkey": self.app_key,
      "appsecret": self.app_secret,
    });

    let response: TokenResponse = transport.post_token(self.token_path(), &body).await?;

    if response.access_token.is_empty() {
      return Err(Error::MissingField("access_token".to_string()));
    }

    let expires_in =
      if response.expires_in > 0 { response.expires_in } else { TOKEN_DEFAULT_TTL_SECS };
    let expired_at = Utc::now() + Duration::seconds(expires_in);

    info!("KIS API token issued (expires at {})", expired_at);

    Ok(CachedToken { access_token: response.access_token, expired_at })
  }

  /// Drop the in-process token so the next call re-enters the lifecycle
  pub async fn invalidate(&self) {
    *self.current.lock().await = None;
  }
}
