use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, PoolError};
use diesel_async::{AsyncConnection, AsyncPgConnection};

/// Connection pool handing out per-worker exclusive sessions
pub type PgPool = Pool<AsyncPgConnection>;

/// Build a bb8 pool over async Postgres connections.
///
/// Each checked-out connection is exclusive to its holder; workers never share
/// a session.
pub async fn establish_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
  let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
  Pool::builder().max_size(max_size).build(manager).await
}

/// Establish a single database connection
pub async fn establish_connection(
  database_url: &str,
) -> Result<AsyncPgConnection, diesel::ConnectionError> {
  AsyncPgConnection::establish(database_url).await
}
