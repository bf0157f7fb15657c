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

//! Stock registry rows and universe-selection queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use crate::schema::{price_history, stock_tag_assignments, stocks};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = stocks)]
pub struct Stock {
  pub id: i32,
  pub symbol: String,
  pub name: String,
  pub market: String,
  pub exchange: Option<String>,
  pub market_cap: Option<f64>,
  pub current_price: Option<f64>,
  pub ma90_price: Option<f64>,
  pub history_records_count: i32,
  pub history_updated_at: Option<DateTime<Utc>>,
  pub signal_analyzed_at: Option<DateTime<Utc>>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stocks)]
pub struct NewStock<'a> {
  pub symbol: &'a str,
  pub name: &'a str,
  pub market: &'a str,
  pub exchange: Option<&'a str>,
  pub market_cap: Option<f64>,
  pub current_price: Option<f64>,
  pub history_records_count: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Derived fields refreshed after a successful collection.
/// `None` fields are left untouched.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = stocks)]
pub struct StockCollectionUpdate {
  pub history_records_count: i32,
  pub ma90_price: Option<f64>,
  pub current_price: Option<f64>,
  pub history_updated_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Stock {
  pub async fn find(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
  ) -> Result<Option<Self>, diesel::result::Error> {
    stocks::table.find(stock_id).first(conn).await.optional()
  }

  /// All active stocks, largest market cap first (NULL caps sort last)
  pub async fn active(
    conn: &mut AsyncPgConnection,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    stocks::table
      .filter(stocks::is_active.eq(true))
      .order((stocks::market_cap.is_null().asc(), stocks::market_cap.desc()))
      .load(conn)
      .await
  }

  /// Active stocks carrying at least one tag assignment
  pub async fn tagged(
    conn: &mut AsyncPgConnection,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    stocks::table
      .inner_join(stock_tag_assignments::table)
      .filter(stocks::is_active.eq(true))
      .select(Stock::as_select())
      .distinct()
      .load(conn)
      .await
  }

  /// Top-N active stocks by market cap
  pub async fn top_by_market_cap(
    conn: &mut AsyncPgConnection,
    limit: i64,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    stocks::table
      .filter(stocks::is_active.eq(true))
      .order((stocks::market_cap.is_null().asc(), stocks::market_cap.desc()))
      .limit(limit)
      .load(conn)
      .await
  }

  /// Active stocks from an explicit id set (retry-failed universes)
  pub async fn by_ids(
    conn: &mut AsyncPgConnection,
    ids: &[i32],
  ) -> Result<Vec<Self>, diesel::result::Error> {
    stocks::table
      .filter(stocks::id.eq_any(ids))
      .filter(stocks::is_active.eq(true))
      .load(conn)
      .await
  }

  /// Stock ids holding at least `min_records` history rows
  pub async fn ids_with_min_history(
    conn: &mut AsyncPgConnection,
    min_records: i64,
  ) -> Result<Vec<i32>, diesel::result::Error> {
    use diesel::dsl::count_star;

    price_history::table
      .group_by(price_history::stock_id)
      .having(count_star().ge(min_records))
      .select(price_history::stock_id)
      .load(conn)
      .await
  }

  /// Keep only stocks whose history changed since their last analysis
  pub async fn delta_filter(
    conn: &mut AsyncPgConnection,
    ids: &[i32],
  ) -> Result<Vec<i32>, diesel::result::Error> {
    stocks::table
      .filter(stocks::id.eq_any(ids))
      .filter(
        stocks::signal_analyzed_at
          .is_null()
          .or(stocks::history_updated_at.gt(stocks::signal_analyzed_at)),
      )
      .select(stocks::id)
      .load(conn)
      .await
  }

  /// Refresh the denormalized fields in a single statement
  pub async fn update_after_collection(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
    update: &StockCollectionUpdate,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(stocks::table.find(stock_id)).set(update).execute(conn).await
  }

  /// Stamp the analysis watermark, unconditionally
  pub async fn mark_signal_analyzed(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
    now: DateTime<Utc>,
  ) -> Result<usize, diesel::result::Error> {
    diesel::update(stocks::table.find(stock_id))
      .set((stocks::signal_analyzed_at.eq(now), stocks::updated_at.eq(now)))
      .execute(conn)
      .await
  }
}

impl<'a> NewStock<'a> {
  pub async fn insert(
    &self,
    conn: &mut AsyncPgConnection,
  ) -> Result<Stock, diesel::result::Error> {
    diesel::insert_into(stocks::table).values(self).get_result(conn).await
  }
}
