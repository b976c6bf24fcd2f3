//! Shared application state: where the database lives and how to open it.
//!
//! No connection is held between requests. Each operation opens its own,
//! runs at most one transaction on it and drops it.

use std::path::PathBuf;
use std::time::Instant;

use crate::db;

pub struct CoreState {
    /// SQLite database file.
    pub db_path: PathBuf,
    started_at: Instant,
}

impl CoreState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            started_at: Instant::now(),
        }
    }

    /// Create the parent directory and bring the schema up to date.
    pub fn initialize(&self) -> Result<(), CoreError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = db::open_database(&self.db_path)?;
        let tables = db::count_tables(&conn)?;
        tracing::info!(path = %self.db_path.display(), tables, "Database ready");
        Ok(())
    }

    /// Open a fresh connection for one operation.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_creates_directory_and_schema() {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::new(tmp.path().join("nested").join("medbook.db"));
        core.initialize().unwrap();
        assert!(core.db_path.exists());

        let conn = core.open_db().unwrap();
        assert_eq!(db::count_tables(&conn).unwrap(), 7);
    }

    #[test]
    fn connections_share_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::new(tmp.path().join("medbook.db"));
        core.initialize().unwrap();

        let first = core.open_db().unwrap();
        db::insert_user(&first, "Ana", "ana@example.com", crate::models::enums::Role::Patient)
            .unwrap();
        let second = core.open_db().unwrap();
        assert!(db::user_exists(&second, 1).unwrap());
    }
}
