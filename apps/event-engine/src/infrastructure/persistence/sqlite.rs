//! SQLite event store.
//!
//! Durable storage for canonical events. The `(ticker, event_date)` natural
//! key is enforced by a storage-level UNIQUE constraint, and the upsert is a
//! single `INSERT ... ON CONFLICT DO UPDATE` statement, so two reconciliation
//! runs racing on the same key can never produce two rows. Overlay columns
//! merge through `COALESCE(excluded.x, x)`: an absent overlay in the incoming
//! row leaves the stored value alone.
//!
//! Timestamps are stored as RFC 3339 TEXT; every event date goes through
//! `DateTime<Utc>` first, so the text form is canonical and key equality on
//! the column matches key equality in the domain.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::ports::{EventStore, StoreError};
use crate::domain::{Event, EventDraft, EventType, Impact, NaturalKey, OverlayPatch, Symbol};

/// Columns selected for every event read.
const EVENT_COLUMNS: &str = "id, ticker, event_date, event_name, event_type, impact, details, \
     clean_implied_vol, dirty_volume, total_implied_vol, vol";

/// SQLite-backed implementation of [`EventStore`].
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    /// Open (creating if missing) the database at `url` and ensure the
    /// schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Storage {
                message: format!("invalid database url '{url}': {e}"),
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::info!(url = url, "event store ready");
        Ok(store)
    }

    /// Open an in-memory database (for tests and local development).
    ///
    /// The pool is pinned to a single connection so the database outlives
    /// individual checkouts.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Storage {
                message: e.to_string(),
            })?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create a store over an existing pool (for testing).
    #[must_use]
    pub const fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ensure the events table and its natural-key constraint exist.
    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS ticker_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                event_date TEXT NOT NULL,
                event_name TEXT NOT NULL,
                event_type TEXT NOT NULL,
                impact TEXT NOT NULL,
                details TEXT NOT NULL DEFAULT '{}',
                clean_implied_vol REAL,
                dirty_volume REAL,
                total_implied_vol REAL,
                vol REAL,
                updated_at TEXT NOT NULL,
                UNIQUE (ticker, event_date)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage {
            message: format!("schema migration failed: {e}"),
        })?;

        Ok(())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }
}

fn encode_details(details: &serde_json::Value) -> Result<String, StoreError> {
    serde_json::to_string(details).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

/// Convert a database row to an [`Event`].
fn row_to_event(row: &SqliteRow) -> Result<Event, StoreError> {
    let missing = |field: &str, e: sqlx::Error| StoreError::Serialization {
        message: format!("{field}: {e}"),
    };

    let date_text: String = row
        .try_get("event_date")
        .map_err(|e| missing("event_date", e))?;
    let event_date: DateTime<Utc> = DateTime::parse_from_rfc3339(&date_text)
        .map_err(|e| StoreError::Serialization {
            message: format!("event_date '{date_text}': {e}"),
        })?
        .with_timezone(&Utc);

    let type_text: String = row
        .try_get("event_type")
        .map_err(|e| missing("event_type", e))?;
    let event_type = EventType::parse(&type_text).ok_or_else(|| StoreError::Serialization {
        message: format!("unknown event type: {type_text}"),
    })?;

    let impact_text: String = row.try_get("impact").map_err(|e| missing("impact", e))?;

    let details_text: String = row.try_get("details").map_err(|e| missing("details", e))?;
    let details = serde_json::from_str(&details_text).map_err(|e| StoreError::Serialization {
        message: format!("details: {e}"),
    })?;

    Ok(Event {
        id: Some(row.try_get::<i64, _>("id").map_err(|e| missing("id", e))?),
        ticker: Symbol::new(
            row.try_get::<String, _>("ticker")
                .map_err(|e| missing("ticker", e))?,
        ),
        event_date,
        event_name: row
            .try_get("event_name")
            .map_err(|e| missing("event_name", e))?,
        event_type,
        impact: Impact::from_label(&impact_text),
        details,
        clean_implied_vol: row.try_get("clean_implied_vol").unwrap_or(None),
        dirty_volume: row.try_get("dirty_volume").unwrap_or(None),
        total_implied_vol: row.try_get("total_implied_vol").unwrap_or(None),
        vol: row.try_get("vol").unwrap_or(None),
    })
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<Event>, StoreError> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM ticker_events WHERE ticker = ?1 AND event_date = ?2"
        );
        let row = sqlx::query(&query)
            .bind(key.ticker.as_str())
            .bind(key.event_date.to_rfc3339())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_event).transpose()
    }

    async fn insert(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let query = format!(
            "INSERT INTO ticker_events (
                ticker, event_date, event_name, event_type, impact, details,
                clean_implied_vol, dirty_volume, total_implied_vol, vol, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(draft.ticker.as_str())
            .bind(draft.event_date.to_rfc3339())
            .bind(&draft.event_name)
            .bind(draft.event_type.as_str())
            .bind(draft.impact.as_str())
            .bind(encode_details(&draft.details)?)
            .bind(draft.overlays.clean_implied_vol)
            .bind(draft.overlays.dirty_volume)
            .bind(draft.overlays.total_implied_vol)
            .bind(draft.overlays.vol)
            .bind(Utc::now().to_rfc3339())
            .fetch_one(&self.pool)
            .await?;

        row_to_event(&row)
    }

    async fn upsert_by_natural_key(&self, draft: &EventDraft) -> Result<Event, StoreError> {
        let query = format!(
            "INSERT INTO ticker_events (
                ticker, event_date, event_name, event_type, impact, details,
                clean_implied_vol, dirty_volume, total_implied_vol, vol, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (ticker, event_date) DO UPDATE SET
                event_name = excluded.event_name,
                event_type = excluded.event_type,
                impact = excluded.impact,
                details = excluded.details,
                clean_implied_vol = COALESCE(excluded.clean_implied_vol, clean_implied_vol),
                dirty_volume = COALESCE(excluded.dirty_volume, dirty_volume),
                total_implied_vol = COALESCE(excluded.total_implied_vol, total_implied_vol),
                vol = COALESCE(excluded.vol, vol),
                updated_at = excluded.updated_at
            RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(draft.ticker.as_str())
            .bind(draft.event_date.to_rfc3339())
            .bind(&draft.event_name)
            .bind(draft.event_type.as_str())
            .bind(draft.impact.as_str())
            .bind(encode_details(&draft.details)?)
            .bind(draft.overlays.clean_implied_vol)
            .bind(draft.overlays.dirty_volume)
            .bind(draft.overlays.total_implied_vol)
            .bind(draft.overlays.vol)
            .bind(Utc::now().to_rfc3339())
            .fetch_one(&self.pool)
            .await?;

        row_to_event(&row)
    }

    async fn update_by_id(&self, id: i64, patch: &OverlayPatch) -> Result<Event, StoreError> {
        let query = format!(
            "UPDATE ticker_events SET
                clean_implied_vol = COALESCE(?2, clean_implied_vol),
                dirty_volume = COALESCE(?3, dirty_volume),
                total_implied_vol = COALESCE(?4, total_implied_vol),
                vol = COALESCE(?5, vol),
                updated_at = ?6
            WHERE id = ?1
            RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(patch.clean_implied_vol)
            .bind(patch.dirty_volume)
            .bind(patch.total_implied_vol)
            .bind(patch.vol)
            .bind(Utc::now().to_rfc3339())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_event(&row),
            None => Err(StoreError::NotFound { id }),
        }
    }

    async fn list(&self, ticker: Option<&Symbol>) -> Result<Vec<Event>, StoreError> {
        let rows = match ticker {
            Some(symbol) => {
                let query = format!(
                    "SELECT {EVENT_COLUMNS} FROM ticker_events WHERE ticker = ?1 \
                     ORDER BY event_date, ticker"
                );
                sqlx::query(&query)
                    .bind(symbol.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {EVENT_COLUMNS} FROM ticker_events ORDER BY event_date, ticker"
                );
                sqlx::query(&query).fetch_all(&self.pool).await?
            }
        };

        rows.iter().map(row_to_event).collect()
    }
}
