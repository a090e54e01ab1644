use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use migrations::run_migrations;
pub use seeder::seed_development_data;

mod migrations;
mod seeder;

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub(crate) type Transaction = sqlx::Transaction<'static, sqlx::Sqlite>;
pub(crate) type Connection = sqlx::SqliteConnection;

/// Opens a pool on `url`, creating the database file if it does not exist yet.
///
/// An in-memory database only lives as long as a connection to it, so those pools hold exactly
/// one connection that is never recycled.
pub async fn connect(url: &str) -> Result<Database, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };
    log::info!("connecting to {}", url);
    pool.connect_with(options).await
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CountRow {
    pub count: i64,
}
