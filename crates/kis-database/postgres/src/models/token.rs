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

//! Persisted upstream-API bearer tokens, one row per `(provider, cache_key)`.
//!
//! Concurrent issuance races resolve last-writer-wins through the upsert;
//! subsequent readers find a valid token either way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use crate::schema::token_cache;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = token_cache)]
pub struct TokenCacheRow {
  pub id: i32,
  pub provider: String,
  pub cache_key: String,
  pub access_token: String,
  pub expired_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = token_cache)]
pub struct NewTokenCacheRow<'a> {
  pub provider: &'a str,
  pub cache_key: &'a str,
  pub access_token: &'a str,
  pub expired_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TokenCacheRow {
  pub async fn load(
    conn: &mut AsyncPgConnection,
    provider: &str,
    cache_key: &str,
  ) -> Result<Option<Self>, diesel::result::Error> {
    token_cache::table
      .filter(token_cache::provider.eq(provider))
      .filter(token_cache::cache_key.eq(cache_key))
      .first(conn)
      .await
      .optional()
  }

  pub async fn upsert(
    conn: &mut AsyncPgConnection,
    provider: &str,
    cache_key: &str,
    access_token: &str,
    expired_at: DateTime<Utc>,
  ) -> Result<usize, diesel::result::Error> {
    let now = Utc::now();
    let row = NewTokenCacheRow { provider, cache_key, access_token, expired_at, updated_at: now };

    diesel::insert_into(token_cache::table)
      .values(&row)
      .on_conflict((token_cache::provider, token_cache::cache_key))
      .do_update()
      .set((
        token_cache::access_token.eq(access_token),
        token_cache::expired_at.eq(expired_at),
        token_cache::updated_at.eq(now),
      ))
      .execute(conn)
      .await
  }
}
