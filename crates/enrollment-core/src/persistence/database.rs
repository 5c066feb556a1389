//! Connection handling for the supported SQLite backends

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::config::{DatabaseLocation, DatabaseSettings, PoolSettings};
use crate::error::{EnrollmentError, PersistenceError, Result};

const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Source of SQLite connections
pub enum Database {
    /// Opens a fresh connection per operation and closes it afterwards
    File { path: PathBuf },
    /// One connection held for the lifetime of the process
    Memory(Mutex<Connection>),
    /// Bounded pool with recycling and liveness checks
    Pooled(r2d2::Pool<SqliteConnectionManager>),
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Database::File { path } => f.debug_struct("File").field("path", path).finish(),
            Database::Memory(_) => f.write_str("Memory"),
            Database::Pooled(pool) => f
                .debug_struct("Pooled")
                .field("max_size", &pool.max_size())
                .finish(),
        }
    }
}

impl Database {
    /// Build the backend described by the settings
    pub fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let location = settings.location()?;

        match (location, &settings.pool) {
            (DatabaseLocation::Memory, pool) => {
                if pool.is_some() {
                    tracing::warn!("Pool settings ignored for in-memory database");
                }
                Self::in_memory()
            }
            (DatabaseLocation::File(path), None) => Self::file(path),
            (DatabaseLocation::File(path), Some(pool)) => Self::pooled(path, pool),
        }
    }

    /// Per-operation connections to a database file
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_parent_dir(&path)?;
        Ok(Database::File { path })
    }

    /// A private in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(Database::Memory(Mutex::new(conn)))
    }

    /// A connection pool over a database file
    pub fn pooled(path: impl AsRef<Path>, settings: &PoolSettings) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let encoding = settings.sqlite_encoding()?;
        if !settings.autocommit {
            tracing::warn!(
                "SQLite connections autocommit outside explicit transactions; autocommit=false has no effect"
            );
        }

        let init_sql = format!("{} PRAGMA encoding = '{}';", CONNECTION_PRAGMAS, encoding);
        let manager =
            SqliteConnectionManager::file(path).with_init(move |conn| conn.execute_batch(&init_sql));

        let pool = r2d2::Pool::builder()
            .max_size(settings.size)
            .max_lifetime(Some(settings.recycle_interval()))
            .test_on_check_out(settings.pre_ping)
            .build(manager)?;

        tracing::info!(
            path = %path.display(),
            size = settings.size,
            recycle_secs = settings.recycle_secs,
            pre_ping = settings.pre_ping,
            "Connection pool ready"
        );
        Ok(Database::Pooled(pool))
    }

    /// Run `op` against a connection from this backend
    pub fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        match self {
            Database::File { path } => {
                let conn = Connection::open(path)?;
                conn.execute_batch(CONNECTION_PRAGMAS)?;
                op(&conn)
            }
            Database::Memory(conn) => {
                let conn = conn.lock().map_err(|e| {
                    EnrollmentError::Persistence(PersistenceError::Database(format!(
                        "Mutex poisoned: {}",
                        e
                    )))
                })?;
                op(&conn)
            }
            Database::Pooled(pool) => {
                let conn = pool.get()?;
                op(&conn)
            }
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(PersistenceError::from)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_enables_foreign_keys() {
        let db = Database::in_memory().unwrap();
        let enabled: i64 = db
            .with_connection(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_memory_state_survives_between_calls() {
        let db = Database::in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute_batch("CREATE TABLE t (x INTEGER);")?;
            Ok(())
        })
        .unwrap();

        let count: i64 = db
            .with_connection(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_connect_rejects_client_server_url() {
        let settings = DatabaseSettings::new("postgres://localhost/enrollment");
        let err = Database::connect(&settings).unwrap_err();
        assert!(matches!(err, EnrollmentError::Config(_)));
    }
}
