//! The persistent record of identifiers that were already acquired.
//!
//! The ledger is written by the external acquisition job; this crate only
//! ever reads it.

use std::{
    collections::HashSet,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::RwLock;
use tracing::debug;
use vitrine_model::ItemId;

use crate::error::LedgerError;

const MAX_CONNECTIONS: u32 = 4;

#[async_trait]
pub trait Ledger: Send + Sync + std::fmt::Debug {
    /// Whether `id` is recorded. Identifiers are compared exactly; callers
    /// pass the normalized form.
    async fn contains(&self, id: &ItemId) -> Result<bool, LedgerError>;
}

/// A read-only view over a SQLite table with one identifier column.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
    query: String,
}

impl SqliteLedger {
    /// Prepares a lazily connected pool. The database file is not touched
    /// until the first lookup, so a missing or locked file surfaces as a
    /// per-request [`LedgerError::Query`] rather than a startup failure.
    pub fn open(
        path: impl AsRef<Path>,
        table: &str,
        column: &str,
    ) -> Result<Self, LedgerError> {
        let table = validate_identifier(table)?;
        let column = validate_identifier(column)?;
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(Duration::from_millis(1500));
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy_with(options);

        Ok(Self {
            pool,
            query: format!(
                "SELECT EXISTS(SELECT 1 FROM \"{table}\" WHERE \"{column}\" = ? LIMIT 1)"
            ),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn contains(&self, id: &ItemId) -> Result<bool, LedgerError> {
        let found: i64 = sqlx::query_scalar(&self.query)
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await?;
        debug!(item_id = %id, found = found != 0, "ledger lookup");
        Ok(found != 0)
    }
}

/// Whether `name` is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Table and column names cannot be bound as parameters, so they are
/// restricted to plain SQL identifiers before being interpolated.
fn validate_identifier(name: &str) -> Result<&str, LedgerError> {
    if is_sql_identifier(name) {
        Ok(name)
    } else {
        Err(LedgerError::InvalidIdentifier(name.to_string()))
    }
}

/// An in-process ledger, used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    ids: RwLock<HashSet<ItemId>>,
    failing: AtomicBool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ItemId>,
    {
        Self {
            ids: RwLock::new(ids.into_iter().collect()),
            failing: AtomicBool::new(false),
        }
    }

    pub async fn record(&self, id: ItemId) {
        self.ids.write().await.insert(id);
    }

    /// Makes every subsequent lookup fail with [`LedgerError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn contains(&self, id: &ItemId) -> Result<bool, LedgerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("memory ledger set to fail".into()));
        }
        Ok(self.ids.read().await.contains(id))
    }
}
