use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::sink::{AlertSink, SinkError, ALERTS_COLLECTION, LOCATION_ALERTS_COLLECTION};

pub mod queries;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(50)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Postgres-backed sink: one table per collection, insert-only.
///
/// Records arrive as the serialized form of the pipeline's output types, so
/// field lookups here mirror their serde names.
pub struct PgAlertSink {
    pool: DbPool,
}

impl PgAlertSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertSink for PgAlertSink {
    async fn append(&self, collection: &str, record: &Value) -> Result<(), SinkError> {
        let text = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_owned);

        let result = match collection {
            ALERTS_COLLECTION => {
                sqlx::query(queries::INSERT_ALERT)
                    .bind(Uuid::new_v4())
                    .bind(text("sender").unwrap_or_default())
                    .bind(text("message").unwrap_or_default())
                    .bind(text("time").unwrap_or_default())
                    .bind(text("sim"))
                    .bind(text("filterName"))
                    .bind(text("receivedAt").unwrap_or_default())
                    .execute(&self.pool)
                    .await
            }
            LOCATION_ALERTS_COLLECTION => {
                sqlx::query(queries::INSERT_LOCATION_ALERT)
                    .bind(Uuid::new_v4())
                    .bind(text("studentLabel").unwrap_or_default())
                    .bind(text("lat").unwrap_or_default())
                    .bind(text("lng").unwrap_or_default())
                    .bind(text("rawMessage").unwrap_or_default())
                    .execute(&self.pool)
                    .await
            }
            other => return Err(SinkError(format!("unknown collection: {other}"))),
        };

        result.map(|_| ()).map_err(|e| SinkError(e.to_string()))
    }
}
