//! # colmeia-db
//!
//! libSQL database operations for Colmeia record keeping.
//!
//! Handles all relational state: users and permissions, species, apiaries,
//! hives, revisions, attachments, reference catalogs, creator profiles and
//! the admin menu configuration. Also hosts the read-side queries behind the
//! home and production dashboards.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) with a local file or an
//! in-memory database.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod scope;
pub mod seed;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use std::ops::Deref;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle for all Colmeia state.
///
/// Wraps a libSQL database and a single connection. Writes go through
/// [`ColmeiaDb::begin`], which serializes transactions on that connection.
pub struct ColmeiaDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    write_lock: Mutex<()>,
}

/// An open write transaction holding the connection's write lock.
///
/// Dropping it without [`WriteTx::commit`] rolls the transaction back.
pub struct WriteTx<'a> {
    tx: libsql::Transaction,
    _guard: MutexGuard<'a, ()>,
}

impl WriteTx<'_> {
    /// Commit the transaction and release the write lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the commit fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl Deref for WriteTx<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

impl ColmeiaDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let colmeia_db = Self {
            db,
            conn,
            write_lock: Mutex::new(()),
        };
        colmeia_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(colmeia_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Start a write transaction.
    ///
    /// Waits for any other open transaction on this handle to finish first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails.
    pub async fn begin(&self) -> Result<WriteTx<'_>, DatabaseError> {
        let guard = self.write_lock.lock().await;
        if !self.conn.is_autocommit() {
            tracing::warn!("rolling back a transaction that was dropped without commit");
            self.conn.execute("ROLLBACK", ()).await?;
        }
        let tx = self.conn.transaction().await?;
        Ok(WriteTx { tx, _guard: guard })
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"hiv-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> ColmeiaDb {
        ColmeiaDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "users",
            "user_permissions",
            "species",
            "box_models",
            "cities",
            "seasons",
            "apiaries",
            "hives",
            "revisions",
            "revision_attachments",
            "creator_profiles",
            "creator_profile_species",
            "menu_configs",
            "menu_items",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("hiv").await.unwrap();
        assert!(id.starts_with("hiv-"), "ID should start with 'hiv-': {id}");
        assert_eq!(id.len(), 12);
        assert!(id[4..].bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let db = test_db().await;
        let insert = "INSERT INTO cities (id, name) VALUES ('cty-00000001', 'Campinas - SP')";
        {
            let tx = db.begin().await.unwrap();
            tx.execute(insert, ()).await.unwrap();
        }

        // Same primary key again: only succeeds if the first insert was discarded.
        let tx = db.begin().await.unwrap();
        tx.execute(insert, ()).await.unwrap();
        tx.commit().await.unwrap();

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM cities", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO apiaries (id, name, owner_id) VALUES ('api-00000001', 'Sítio', 'usr-missing')",
                (),
            )
            .await;
        assert!(result.is_err(), "apiary without owner should be rejected");
    }
}
