//! SQLite backed reservation store.

use super::{ReservationStore, StoreError};
use crate::models::{Block, Reservation};
use rusqlite::{ffi, params, Connection};
use std::net::IpAddr;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Default time a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS ips (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        cidr TEXT NOT NULL,
        tenant_name TEXT NOT NULL,
        ip_address TEXT NOT NULL,
        purpose TEXT NOT NULL,
        UNIQUE (cidr, tenant_name, ip_address)
    )"#;

const EXISTS_ANY_TENANT: &str =
    "SELECT EXISTS(SELECT 1 FROM ips WHERE cidr = ?1 AND ip_address = ?2)";
const EXISTS_FOR_TENANT: &str =
    "SELECT EXISTS(SELECT 1 FROM ips WHERE cidr = ?1 AND ip_address = ?2 AND tenant_name = ?3)";

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            // NOT NULL and CHECK violations share the primary code, only UNIQUE is a conflict.
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::Conflict
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

/// Reservation store over the `ips` table.
///
/// The connection is shared behind a mutex; every method is a single statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();
        log::info!("Opening reservation database {}", path.display());
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::init(conn)
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves nothing half written in the connection itself.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ReservationStore for SqliteStore {
    fn insert(&self, reservation: &Reservation) -> Result<(), StoreError> {
        self.conn().execute(
            "INSERT INTO ips (cidr, tenant_name, ip_address, purpose) VALUES (?1, ?2, ?3, ?4)",
            params![
                reservation.block.descriptor(),
                reservation.tenant,
                reservation.address.to_string(),
                reservation.purpose
            ],
        )?;
        Ok(())
    }

    fn delete(&self, block: &Block, tenant: &str, address: IpAddr) -> Result<usize, StoreError> {
        let removed = self.conn().execute(
            "DELETE FROM ips WHERE cidr = ?1 AND tenant_name = ?2 AND ip_address = ?3",
            params![block.descriptor(), tenant, address.to_string()],
        )?;
        Ok(removed)
    }

    fn exists(&self, address: IpAddr, block: &Block, tenant: &str) -> Result<bool, StoreError> {
        let conn = self.conn();
        let address = address.to_string();
        let found = if tenant.is_empty() {
            conn.query_row(
                EXISTS_ANY_TENANT,
                params![block.descriptor(), address],
                |row| row.get(0),
            )?
        } else {
            conn.query_row(
                EXISTS_FOR_TENANT,
                params![block.descriptor(), address, tenant],
                |row| row.get(0),
            )?
        };
        Ok(found)
    }

    fn list_addresses(&self, block: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT ip_address FROM ips WHERE cidr = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![block], |row| row.get::<_, String>(0))?;

        let mut addresses = Vec::new();
        for row in rows {
            addresses.push(row?);
        }
        Ok(addresses)
    }
}
