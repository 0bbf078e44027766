//! Bulk document operations.

use sqlx::Row;
use tracing::{debug, error};

use super::records::{Document, DocumentFilter};
use super::Database;
use crate::errors::StoreError;

impl Database {
    pub(super) async fn delete_documents(&self, filter: &DocumentFilter) -> Result<u64, StoreError> {
        debug!(
            "Deleting documents in {} where '{}' exists",
            filter.collection, filter.field_exists
        );

        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = ?
              AND json_extract(body, '$.' || ?) IS NOT NULL
            "#,
        )
        .bind(&filter.collection)
        .bind(&filter.field_exists)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// All-or-nothing insert; a duplicate id rolls back the whole batch
    pub(super) async fn insert_documents(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for document in documents {
            let body = serde_json::to_string(&document.body)?;
            if let Err(e) = sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
                .bind(collection)
                .bind(&document.id)
                .bind(&body)
                .execute(&mut *tx)
                .await
            {
                error!("Failed to insert document {} into {}: {}", document.id, collection, e);
                return Err(e.into());
            }
            inserted += 1;
        }

        tx.commit().await?;
        debug!("Inserted {} documents into {}", inserted, collection);
        Ok(inserted)
    }

    pub async fn count_documents(&self, collection: &str) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }

    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT id, body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.try_get("body")?;
                Ok(Some(Document {
                    id: row.try_get("id")?,
                    body: serde_json::from_str(&body)?,
                }))
            }
            None => Ok(None),
        }
    }
}
