// SQLite-backed session storage

use crate::error::Result;
use crate::handler::SessionHandler;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS pSession (
    Id        TEXT PRIMARY KEY,
    IpAddress TEXT NOT NULL DEFAULT '',
    Timestamp INTEGER NOT NULL,
    Expire    INTEGER NOT NULL,
    Data      TEXT NOT NULL
)";

/// Sessions in a `pSession` table.
///
/// Rows carry their own expiry; an expired row reads as empty until `gc`
/// sweeps it. The connection is wrapped in a mutex and never held across an
/// await point.
pub struct DatabaseSessionHandler {
    conn: Mutex<Connection>,
    lifetime_secs: u64,
    client_ip: Mutex<Option<String>>,
}

impl DatabaseSessionHandler {
    pub fn new(path: impl AsRef<Path>, lifetime_secs: u64) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
            lifetime_secs,
            client_ip: Mutex::new(None),
        })
    }

    /// In-memory database, for tests and tools.
    pub fn in_memory(lifetime_secs: u64) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            lifetime_secs,
            client_ip: Mutex::new(None),
        })
    }

    /// Record the client address stored alongside new session rows.
    pub fn set_client_ip(&self, ip: impl Into<String>) {
        *self.client_ip.lock() = Some(ip.into());
    }
}

#[async_trait]
impl SessionHandler for DatabaseSessionHandler {
    async fn open(&self) -> Result<()> {
        self.conn.lock().execute(CREATE_TABLE, [])?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let conn = self.conn.lock();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT Data, Expire FROM pSession WHERE Id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            Some((data, expire)) if expire >= now => Ok(data),
            _ => Ok(String::new()),
        }
    }

    async fn write(&self, id: &str, data: &str) -> Result<()> {
        let now = Utc::now().timestamp();
        let expire = now + self.lifetime_secs as i64;
        let ip = self.client_ip.lock().clone().unwrap_or_default();
        self.conn.lock().execute(
            "INSERT INTO pSession (Id, IpAddress, Timestamp, Expire, Data)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(Id) DO UPDATE
             SET Timestamp = excluded.Timestamp,
                 Expire = excluded.Expire,
                 Data = excluded.Data",
            params![id, ip, now, expire, data],
        )?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM pSession WHERE Id = ?1", params![id])?;
        Ok(())
    }

    async fn gc(&self, max_lifetime_secs: u64) -> Result<usize> {
        let cutoff = Utc::now().timestamp() - max_lifetime_secs as i64;
        let removed = self.conn.lock().execute(
            "DELETE FROM pSession WHERE Timestamp < ?1 OR Expire < ?2",
            params![cutoff, Utc::now().timestamp()],
        )?;
        Ok(removed)
    }
}
