// SQLite-backed admin storage

use crate::error::{AuthError, Result};
use crate::rank::{Category, Level};
use crate::storage::AdminStorage;
use crate::user::AdminUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeMap;
use std::path::Path;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS pAdminUser (
    UserId     TEXT PRIMARY KEY,
    Password   TEXT NOT NULL,
    Category   INTEGER NOT NULL,
    Level      INTEGER NOT NULL,
    Profile    TEXT NOT NULL DEFAULT '{}',
    CreateDate INTEGER NOT NULL,
    LapseDate  INTEGER,
    StopFlag   INTEGER NOT NULL DEFAULT 0
)";

/// Admin records in a `pAdminUser` table.
pub struct SqliteAdminStorage {
    conn: Mutex<Connection>,
}

impl SqliteAdminStorage {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open(path)?),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<(AdminUser, String)> {
        let category_code: u8 = row.get(2)?;
        let level: u8 = row.get(3)?;
        let profile_json: String = row.get(4)?;
        let create_ts: i64 = row.get(5)?;
        let lapse_ts: Option<i64> = row.get(6)?;
        let user = AdminUser {
            user_id: row.get(0)?,
            password: row.get(1)?,
            category: Category::from_code(category_code).unwrap_or(Category::Both),
            level: Level::new(level),
            profile: BTreeMap::new(),
            create_date: DateTime::from_timestamp(create_ts, 0).unwrap_or_else(Utc::now),
            lapse_date: lapse_ts.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            stop_flag: row.get::<_, i64>(7)? != 0,
        };
        Ok((user, profile_json))
    }

    fn finish_user((mut user, profile_json): (AdminUser, String)) -> Result<AdminUser> {
        user.profile =
            serde_json::from_str(&profile_json).map_err(|e| AuthError::Encoding(e.to_string()))?;
        Ok(user)
    }
}

#[async_trait]
impl AdminStorage for SqliteAdminStorage {
    async fn open(&self) -> Result<()> {
        self.conn.lock().execute(CREATE_TABLE, [])?;
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<AdminUser>> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT UserId, Password, Category, Level, Profile, CreateDate, LapseDate, StopFlag
                 FROM pAdminUser WHERE UserId = ?1",
                params![user_id],
                Self::row_to_user,
            )
            .optional()?;
        row.map(Self::finish_user).transpose()
    }

    async fn save(&self, user: &AdminUser) -> Result<()> {
        let profile = serde_json::to_string(&user.profile)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;
        self.conn.lock().execute(
            "INSERT INTO pAdminUser
                 (UserId, Password, Category, Level, Profile, CreateDate, LapseDate, StopFlag)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(UserId) DO UPDATE
             SET Password = excluded.Password,
                 Category = excluded.Category,
                 Level = excluded.Level,
                 Profile = excluded.Profile,
                 LapseDate = excluded.LapseDate,
                 StopFlag = excluded.StopFlag",
            params![
                user.user_id,
                user.password,
                user.category.code(),
                user.level.value(),
                profile,
                user.create_date.timestamp(),
                user.lapse_date.map(|d| d.timestamp()),
                user.stop_flag as i64,
            ],
        )?;
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool> {
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM pAdminUser WHERE UserId = ?1", params![user_id])?;
        Ok(removed > 0)
    }

    async fn all(&self) -> Result<Vec<AdminUser>> {
        let rows: Vec<(AdminUser, String)> = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(
                "SELECT UserId, Password, Category, Level, Profile, CreateDate, LapseDate, StopFlag
                 FROM pAdminUser",
            )?;
            let mapped = stmt.query_map([], Self::row_to_user)?;
            mapped.collect::<rusqlite::Result<_>>()?
        };
        rows.into_iter().map(Self::finish_user).collect()
    }

    async fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM pAdminUser", [], |row| row.get(0))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{PROFILE_NAME, hashed_user_id};
    use chrono::Duration;

    async fn storage() -> SqliteAdminStorage {
        let storage = SqliteAdminStorage::in_memory().unwrap();
        storage.open().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let storage = storage().await;
        let mut user = AdminUser::new("alice", "hash", Category::Devel, Level::MANAGER);
        user.profile
            .insert(PROFILE_NAME.to_string(), "Alice".to_string());
        user.lapse_date = Some(Utc::now() + Duration::days(30));
        storage.save(&user).await.unwrap();

        let loaded = storage
            .load(&hashed_user_id("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.login_id(), "alice");
        assert_eq!(loaded.category, Category::Devel);
        assert_eq!(loaded.level, Level::MANAGER);
        assert_eq!(loaded.profile.get(PROFILE_NAME).unwrap(), "Alice");
        // Timestamps survive at second precision.
        assert_eq!(
            loaded.lapse_date.unwrap().timestamp(),
            user.lapse_date.unwrap().timestamp()
        );
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let storage = storage().await;
        let mut user = AdminUser::new("alice", "hash1", Category::Both, Level::BOTTOM);
        storage.save(&user).await.unwrap();

        user.password = "hash2".to_string();
        user.stop_flag = true;
        storage.save(&user).await.unwrap();

        let loaded = storage.load(&user.user_id).await.unwrap().unwrap();
        assert_eq!(loaded.password, "hash2");
        assert!(loaded.stop_flag);
        assert_eq!(storage.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_initialized_and_delete() {
        let storage = storage().await;
        assert!(!storage.is_initialized().await.unwrap());

        let user = AdminUser::new("alice", "hash", Category::Both, Level::BOTTOM);
        storage.save(&user).await.unwrap();
        assert!(storage.is_initialized().await.unwrap());

        assert!(storage.delete(&user.user_id).await.unwrap());
        assert!(!storage.delete(&user.user_id).await.unwrap());
        assert!(!storage.is_initialized().await.unwrap());
    }
}
