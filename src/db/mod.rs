//! SQLite-backed document store.
//!
//! A single connection behind a mutex is enough here: SQLite serializes
//! writes anyway, and workers spend their time in recognition, not in the
//! store. WAL mode keeps status polls cheap while a worker is writing.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;

pub mod document_repo;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Could not create database directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store mutex poisoned by a panicking thread")]
    LockPoisoned,
}

/// Bumped whenever the schema below changes shape.
const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        id                 TEXT PRIMARY KEY,
        filename           TEXT NOT NULL,
        status             TEXT NOT NULL DEFAULT 'UPLOADED',
        metadata           TEXT,
        recognition_result TEXT,
        failure_reason     TEXT,
        created_at         TEXT NOT NULL,
        updated_at         TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents(created_at);
    CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
";

/// Shared handle to the document store. Clones refer to the same
/// underlying connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the store at `path`, creating the file, its parent
    /// directories and the schema as needed.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        log::info!("Document store opened at {}", path.display());
        Self::with_schema(conn)
    }

    /// In-memory store for tests and ephemeral runs.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> Result<Self, DatabaseError> {
        let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if version < SCHEMA_VERSION {
            conn.execute_batch(SCHEMA)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            log::debug!("Document store schema set up at version {}", SCHEMA_VERSION);
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Exclusive access to the connection for the repository functions.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

/// Default store location: `~/.docflow/data/docflow.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".docflow").join("data").join("docflow.db"))
}
