//! Upstream inputs: finalized day summaries and account creation events.

use chrono::NaiveDate;
use sqlx::Row;

use super::records::DaySummary;
use super::Database;
use crate::errors::StoreError;

impl Database {
    pub(super) async fn read_latest_day_summary(&self) -> Result<Option<DaySummary>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT date, hash_for_last_block, height_for_last_block
            FROM blocks_per_day
            ORDER BY height_for_last_block DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let date: String = row.try_get("date")?;
        let height: i64 = row.try_get("height_for_last_block")?;

        Ok(Some(DaySummary {
            date: parse_date(&date)?,
            hash_for_last_block: row.try_get("hash_for_last_block")?,
            height_for_last_block: to_height(height)?,
        }))
    }

    pub(super) async fn read_accounts_created_up_to(
        &self,
        block_height: u64,
    ) -> Result<Vec<String>, StoreError> {
        let height = i64::try_from(block_height).map_err(|_| StoreError::InvalidValue {
            field: "block_height".to_string(),
            reason: format!("{} does not fit in a signed 64-bit column", block_height),
        })?;

        let rows = sqlx::query(
            "SELECT account_id FROM account_creations WHERE block_height <= ? ORDER BY block_height, account_id",
        )
        .bind(height)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("account_id").map_err(StoreError::from))
            .collect()
    }

    /// Record the finalized tip of `date`; replaces any earlier summary for that day
    pub async fn upsert_day_summary(&self, summary: &DaySummary) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO blocks_per_day (date, hash_for_last_block, height_for_last_block)
            VALUES (?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                hash_for_last_block = excluded.hash_for_last_block,
                height_for_last_block = excluded.height_for_last_block
            "#,
        )
        .bind(summary.date.format("%Y-%m-%d").to_string())
        .bind(&summary.hash_for_last_block)
        .bind(summary.height_for_last_block as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_account_creation(
        &self,
        account_id: &str,
        block_height: u64,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO account_creations (account_id, block_height) VALUES (?, ?)")
            .bind(account_id)
            .bind(block_height as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| StoreError::InvalidValue {
        field: "date".to_string(),
        reason: format!("'{}': {}", value, e),
    })
}

fn to_height(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::InvalidValue {
        field: "height_for_last_block".to_string(),
        reason: format!("negative height {}", value),
    })
}
