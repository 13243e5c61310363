//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, instrument};

use rates_types::{
    RateObservation, RateStore, RepoError, Subscriber, SubscriberEmail, SubscriptionStore,
};

use crate::types::{DbRate, DbSubscription, encode_date, encode_timestamp};

const MIGRATIONS: [&str; 2] = [
    include_str!("../migrations/0001_create_usd_uah_rate.sql"),
    include_str!("../migrations/0002_create_subscription.sql"),
];

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let mut options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // An in-memory database lives and dies with its connection; keep exactly one.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema. Safe to run repeatedly.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        for ddl in MIGRATIONS {
            sqlx::raw_sql(ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate log
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateStore for SqliteRepo {
    async fn latest(&self) -> Result<Option<RateObservation>, RepoError> {
        let row: Option<DbRate> = sqlx::query_as(
            r#"SELECT timestamp, value, effective_date FROM usd_uah_rate
               ORDER BY timestamp DESC, id DESC LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbRate::into_domain).transpose()
    }

    #[instrument(skip(self), fields(value = observation.value()))]
    async fn append(&self, observation: RateObservation) -> Result<(), RepoError> {
        // A single INSERT is atomic; readers see the row entirely or not at all.
        sqlx::query(
            r#"INSERT INTO usd_uah_rate (timestamp, value, effective_date) VALUES (?, ?, ?)"#,
        )
        .bind(encode_timestamp(observation.timestamp()))
        .bind(observation.value())
        .bind(encode_date(observation.effective_date()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        debug!("Appended rate observation");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subscriptions
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl SubscriptionStore for SqliteRepo {
    #[instrument(skip(self), fields(email = %email))]
    async fn try_subscribe(&self, email: &SubscriberEmail) -> Result<Subscriber, RepoError> {
        let subscriber = Subscriber::new(email.clone());

        let result = sqlx::query(r#"INSERT INTO subscription (timestamp, email) VALUES (?, ?)"#)
            .bind(encode_timestamp(subscriber.subscribed_at))
            .bind(email.as_str())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(subscriber),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(RepoError::AlreadySubscribed(email.to_string()))
            }
            Err(e) => Err(RepoError::Database(e.to_string())),
        }
    }

    async fn all_subscribers(&self) -> Result<Vec<Subscriber>, RepoError> {
        let rows: Vec<DbSubscription> =
            sqlx::query_as(r#"SELECT timestamp, email FROM subscription ORDER BY id ASC"#)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbSubscription::into_domain).collect()
    }
}
