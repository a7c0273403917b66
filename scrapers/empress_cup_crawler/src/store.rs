use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
    time::Duration,
};
use tracing::{debug, info};

use crate::{
    config::DatabaseConfig,
    error::{CrawlError, Result},
    types::MatchRecord,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS empress_matches (
    match_id    TEXT PRIMARY KEY,
    status      TEXT NOT NULL,
    score       TEXT,
    home_team   TEXT,
    away_team   TEXT,
    match_date  TEXT,
    updated_at  TIMESTAMPTZ NOT NULL
)
"#;

/// Destination for parsed matches. One stored entry per match id; a write
/// replaces every field of the previous one.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn upsert_match(&self, record: &MatchRecord, updated_at: DateTime<Utc>) -> Result<()>;
}

/// Writes every record in order, one statement each. Stops at the first failure;
/// rows written before it stay written.
pub async fn upsert_all(
    store: &dyn MatchStore,
    records: &BTreeMap<String, MatchRecord>,
    updated_at: DateTime<Utc>,
) -> Result<usize> {
    for record in records.values() {
        store.upsert_match(record, updated_at).await?;
        debug!("Upserted match {} ({})", record.id, record.status.as_str());
    }
    Ok(records.len())
}

pub struct PgMatchStore {
    pool: Pool<Postgres>,
    write_timeout: Duration,
}

impl PgMatchStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.require_url()?)
            .await?;

        let store = Self {
            pool,
            write_timeout: Duration::from_secs(config.write_timeout_secs),
        };
        store.ensure_schema().await?;
        info!("Connected to match database");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed match database pool");
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn upsert_match(&self, record: &MatchRecord, updated_at: DateTime<Utc>) -> Result<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO empress_matches (
                match_id, status, score, home_team, away_team, match_date, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (match_id) DO UPDATE SET
                status = EXCLUDED.status,
                score = EXCLUDED.score,
                home_team = EXCLUDED.home_team,
                away_team = EXCLUDED.away_team,
                match_date = EXCLUDED.match_date,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(record.status.as_str())
        .bind(&record.score)
        .bind(&record.home_team)
        .bind(&record.away_team)
        .bind(&record.date)
        .bind(updated_at);

        tokio::time::timeout(self.write_timeout, query.execute(&self.pool))
            .await
            .map_err(|_| CrawlError::Timeout {
                operation: format!("upsert of match {}", record.id),
                secs: self.write_timeout.as_secs(),
            })??;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMatch {
    pub record: MatchRecord,
    pub updated_at: DateTime<Utc>,
}

/// In-process store with the same upsert semantics as the Postgres one. Used for
/// dry runs.
#[derive(Debug, Default)]
pub struct MemoryMatchStore {
    matches: Mutex<HashMap<String, StoredMatch>>,
    writes: Mutex<usize>,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, match_id: &str) -> Option<StoredMatch> {
        self.matches.lock().unwrap().get(match_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.matches.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total upserts issued, including overwrites.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn snapshot(&self) -> BTreeMap<String, StoredMatch> {
        self.matches
            .lock()
            .unwrap()
            .iter()
            .map(|(id, stored)| (id.clone(), stored.clone()))
            .collect()
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn upsert_match(&self, record: &MatchRecord, updated_at: DateTime<Utc>) -> Result<()> {
        self.matches.lock().unwrap().insert(
            record.id.clone(),
            StoredMatch {
                record: record.clone(),
                updated_at,
            },
        );
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}
