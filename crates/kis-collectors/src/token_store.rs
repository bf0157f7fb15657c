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

//! Database-backed token cache bridging the client's narrow store interface
//! onto the `token_cache` table, so bearer tokens survive process restarts.

use async_trait::async_trait;
use kis_client::{CachedToken, TokenCacheStore};
use kis_core::{Error, Result};
use kis_database_postgres::PgPool;
use kis_database_postgres::models::TokenCacheRow;

pub struct PgTokenCacheStore {
  pool: PgPool,
}

impl PgTokenCacheStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl TokenCacheStore for PgTokenCacheStore {
  async fn load(&self, provider: &str, cache_key: &str) -> Result<Option<CachedToken>> {
    let mut conn = self
      .pool
      .get()
      .await
      .map_err(|e| Error::Unexpected(format!("token cache pool: {}", e)))?;

    let row = TokenCacheRow::load(&mut conn, provider, cache_key)
      .await
      .map_err(|e| Error::Unexpected(format!("token cache load: {}", e)))?;

    Ok(row.map(|r| CachedToken { access_token: r.access_token, expired_at: r.expired_at }))
  }

  async fn save(&self, provider: &str, cache_key: &str, token: &CachedToken) -> Result<()> {
    let mut conn = self
      .pool
      .get()
      .await
      .map_err(|e| Error::Unexpected(format!("token cache pool: {}", e)))?;

    TokenCacheRow::upsert(&mut conn, provider, cache_key, &token.access_token, token.expired_at)
      .await
      .map_err(|e| Error::Unexpected(format!("token cache save: {}", e)))?;

    Ok(())
  }
}
