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

//! Daily OHLCV rows owned by a stock.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use crate::schema::price_history;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = price_history)]
pub struct PriceHistory {
  pub id: i64,
  pub stock_id: i32,
  pub date: NaiveDate,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
  pub volume: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = price_history)]
pub struct NewPriceHistory {
  pub stock_id: i32,
  pub date: NaiveDate,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
  pub volume: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl NewPriceHistory {
  /// Upsert on `(stock_id, date)`: re-collection of an already-stored day
  /// refreshes the prices instead of duplicating the row.
  pub async fn upsert(
    &self,
    conn: &mut AsyncPgConnection,
  ) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(price_history::table)
      .values(self)
      .on_conflict((price_history::stock_id, price_history::date))
      .do_update()
      .set((
        price_history::open.eq(self.open),
        price_history::high.eq(self.high),
        price_history::low.eq(self.low),
        price_history::close.eq(self.close),
        price_history::volume.eq(self.volume),
        price_history::updated_at.eq(self.updated_at),
      ))
      .execute(conn)
      .await
  }
}

impl PriceHistory {
  /// Most recent stored trading date for a stock
  pub async fn latest_date(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
  ) -> Result<Option<NaiveDate>, diesel::result::Error> {
    price_history::table
      .filter(price_history::stock_id.eq(stock_id))
      .order(price_history::date.desc())
      .select(price_history::date)
      .first(conn)
      .await
      .optional()
  }

  /// Exact row count; backs the `history_records_count` invariant
  pub async fn count_for_stock(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
  ) -> Result<i64, diesel::result::Error> {
    use diesel::dsl::count_star;

    price_history::table
      .filter(price_history::stock_id.eq(stock_id))
      .select(count_star())
      .first(conn)
      .await
  }

  /// Rows on or after `from_date`, ascending by date
  pub async fn load_since(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
    from_date: NaiveDate,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    price_history::table
      .filter(price_history::stock_id.eq(stock_id))
      .filter(price_history::date.ge(from_date))
      .order(price_history::date.asc())
      .load(conn)
      .await
  }

  /// Close prices of the most recent `limit` rows, newest first
  pub async fn recent_closes(
    conn: &mut AsyncPgConnection,
    stock_id: i32,
    limit: i64,
  ) -> Result<Vec<f64>, diesel::result::Error> {
    price_history::table
      .filter(price_history::stock_id.eq(stock_id))
      .order(price_history::date.desc())
      .limit(limit)
      .select(price_history::close)
      .load(conn)
      .await
  }
}
