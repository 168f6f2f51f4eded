//! Service layer that hosts every repository method.
//!
//! `ColmeiaService` wraps `ColmeiaDb`. All repo methods are implemented as
//! `impl ColmeiaService` blocks under [`crate::repos`].

use crate::ColmeiaDb;
use crate::error::DatabaseError;

/// Entry point for all reads and writes.
///
/// Mutations that touch more than one row (hive counts, last review dates,
/// menu activation, personal data removal) run inside a single
/// [`ColmeiaDb::begin`] transaction.
pub struct ColmeiaService {
    db: ColmeiaDb,
}

impl ColmeiaService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = ColmeiaDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ColmeiaDb {
        &self.db
    }
}
