use std::env;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tokio::task;

use crate::shared::dispatchers::Dispatchers;
use crate::shared::errors::{AppError, AppResult};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite needs these set per connection, not per database.
#[derive(Debug)]
struct SqlitePragmas;

impl r2d2::CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Connection pool plus the width-limited read/write lanes every query
/// goes through.
pub struct Database {
    pool: DbPool,
    dispatchers: Dispatchers,
}

impl Database {
    pub fn new(database_url: &str, dispatchers: Dispatchers) -> AppResult<Self> {
        Self::build(database_url, 8, dispatchers)
    }

    /// Database path from the `WATCHDONE_DATABASE` environment variable.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let database_url = env::var("WATCHDONE_DATABASE").map_err(|_| {
            AppError::InvalidInput("WATCHDONE_DATABASE is not set".to_string())
        })?;
        Self::new(&database_url, Dispatchers::default())
    }

    /// Private in-memory database. A single pooled connection keeps all
    /// lanes on the same memory instance.
    pub fn in_memory() -> AppResult<Self> {
        Self::build(":memory:", 1, Dispatchers::default())
    }

    fn build(database_url: &str, max_size: u32, dispatchers: Dispatchers) -> AppResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);

        let pool = r2d2::Pool::builder()
            // Pool sizing - writes are serialized anyway, reads capped at width 4
            .max_size(max_size)
            .connection_timeout(Duration::from_secs(10)) // Time to wait for connection from pool
            .idle_timeout(Some(Duration::from_secs(300))) // Close idle connections after 5 minutes
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create connection pool: {}", e))
            })?;

        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        drop(conn);

        log::info!(
            "Database connection pool initialized with max_size: {}",
            pool.max_size()
        );

        Ok(Self { pool, dispatchers })
    }

    /// Run a read-only query on the bounded read lane.
    pub async fn read<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> AppResult<T> + Send + 'static,
    {
        let _permit = self.dispatchers.acquire_db_read().await?;
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }

    /// Run a mutating query on the serialized write lane.
    pub async fn write<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> AppResult<T> + Send + 'static,
    {
        let _permit = self.dispatchers.acquire_db_write().await?;
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }

    /// Get pool statistics for monitoring
    pub fn pool_status(&self) -> PoolStatus {
        let state = self.pool.state();
        PoolStatus {
            connections: state.connections,
            idle_connections: state.idle_connections,
            max_size: self.pool.max_size(),
        }
    }
}

#[derive(Debug)]
pub struct PoolStatus {
    pub connections: u32,
    pub idle_connections: u32,
    pub max_size: u32,
}
