//! Persistence gateway. Handlers never touch the pool directly; every
//! statement goes through [`Database::query`] or [`Database::execute`].

use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    FromRow, SqlitePool,
};
use thiserror::Error;
use tracing::{debug, info};

pub mod seed;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    /// True when the store rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

/// A positional bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Int(i64),
    Real(f64),
    Text(String),
    Null,
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Real(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_owned())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map_or(Param::Null, Into::into)
    }
}

/// Result of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub inserted_id: i64,
    pub rows_affected: u64,
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("parse database url {url}"))?
            .create_if_missing(true)
            .foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .context("connect to database")?;
        info!(url, "connected to sqlite");
        Ok(Self { pool })
    }

    /// Private in-memory database. The pool is pinned to a single connection
    /// that never expires, since every sqlite connection to `:memory:` opens
    /// its own empty database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("open in-memory database")?;
        Ok(Self { pool })
    }

    /// Creates the tables if they do not exist yet. Safe to call on every start.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("schema ready");
        Ok(())
    }

    /// Runs a read statement and maps every row into `T`. No match yields an
    /// empty vector.
    pub async fn query<T>(&self, sql: &str, params: &[Param]) -> Result<Vec<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut q = sqlx::query_as::<_, T>(sql);
        for p in params {
            q = match p {
                Param::Int(v) => q.bind(*v),
                Param::Real(v) => q.bind(*v),
                Param::Text(v) => q.bind(v.clone()),
                Param::Null => q.bind(None::<String>),
            };
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Like [`Database::query`] but keeps only the first row.
    pub async fn query_one<T>(&self, sql: &str, params: &[Param]) -> Result<Option<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        Ok(self.query::<T>(sql, params).await?.into_iter().next())
    }

    pub async fn execute(&self, sql: &str, params: &[Param]) -> Result<ExecOutcome, StorageError> {
        let mut q = sqlx::query(sql);
        for p in params {
            q = match p {
                Param::Int(v) => q.bind(*v),
                Param::Real(v) => q.bind(*v),
                Param::Text(v) => q.bind(v.clone()),
                Param::Null => q.bind(None::<String>),
            };
        }
        let res = q.execute(&self.pool).await?;
        Ok(ExecOutcome {
            inserted_id: res.last_insert_rowid(),
            rows_affected: res.rows_affected(),
        })
    }

    /// `SELECT COUNT(*)` helper.
    pub async fn count(&self, table: Table) -> Result<i64, StorageError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let row: Option<(i64,)> = self.query_one(&sql, &[]).await?;
        Ok(row.map_or(0, |(n,)| n))
    }
}

/// Tables owned by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Products,
    Orders,
    Tutorials,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Products => "products",
            Table::Orders => "orders",
            Table::Tutorials => "tutorials",
        }
    }
}
