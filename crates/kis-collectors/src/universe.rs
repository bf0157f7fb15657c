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

//! Stock-universe selection shared by collection and analysis jobs.

use diesel_async::AsyncPgConnection;
use kis_core::CollectionMode;
use kis_database_postgres::models::Stock;

/// Which stocks a job operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniverseSelector {
  /// Every active stock, largest market cap first
  AllActive,
  /// Active stocks carrying at least one tag
  Tagged,
  /// Top N active stocks by market cap
  TopByMarketCap(i64),
  /// An explicit id set (retry-failed)
  Ids(Vec<i32>),
}

impl UniverseSelector {
  /// Map the configured collection mode onto a selector
  pub fn from_mode(mode: CollectionMode, limit: u32) -> Self {
    match mode {
      CollectionMode::Tagged => UniverseSelector::Tagged,
      CollectionMode::All => UniverseSelector::AllActive,
      CollectionMode::Top => UniverseSelector::TopByMarketCap(limit as i64),
    }
  }

  pub async fn select(
    &self,
    conn: &mut AsyncPgConnection,
  ) -> Result<Vec<Stock>, diesel::result::Error> {
    match self {
      UniverseSelector::AllActive => Stock::active(conn).await,
      UniverseSelector::Tagged => Stock::tagged(conn).await,
      UniverseSelector::TopByMarketCap(limit) => Stock::top_by_market_cap(conn, *limit).await,
      UniverseSelector::Ids(ids) => Stock::by_ids(conn, ids).await,
    }
  }

  pub fn label(&self) -> String {
    match self {
      UniverseSelector::AllActive => "all".to_string(),
      UniverseSelector::Tagged => "tagged".to_string(),
      UniverseSelector::TopByMarketCap(limit) => format!("top {}", limit),
      UniverseSelector::Ids(ids) => format!("{} retried stocks", ids.len()),
    }
  }
}
