//! Test database utilities for in-memory SQLite testing

use snapshotter::database::Database;

/// Create a fresh in-memory document store with all tables
pub async fn test_database() -> Database {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory test database")
}
