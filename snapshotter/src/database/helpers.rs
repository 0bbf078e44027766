//! Helper values, currently only the last-completed marker.

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use super::records::MarkerRecord;
use super::Database;
use crate::errors::StoreError;

impl Database {
    pub(super) async fn read_marker(&self, id: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT body FROM helpers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body")?;
                let marker: MarkerRecord = serde_json::from_str(&body)?;
                Ok(Some(marker.date))
            }
            None => Ok(None),
        }
    }

    pub(super) async fn write_marker(&self, id: &str, value: &str) -> Result<(), StoreError> {
        let body = serde_json::to_string(&MarkerRecord {
            date: value.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO helpers (id, body, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(&body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!("Marker {} set to {}", id, value);
        Ok(())
    }
}
