// File-backed admin storage, one <hashed-id>.auth JSON file per user

use crate::error::{AuthError, Result};
use crate::storage::AdminStorage;
use crate::user::AdminUser;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Admin records as JSON files under one directory.
pub struct FileAdminStorage {
    directory: PathBuf,
}

impl FileAdminStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn user_path(&self, user_id: &str) -> PathBuf {
        // Ids are sha256 hex; anything else is filtered before it can name a
        // path.
        let safe: String = user_id
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        self.directory.join(format!("{safe}.auth"))
    }
}

#[async_trait]
impl AdminStorage for FileAdminStorage {
    async fn open(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        Ok(())
    }

    async fn load(&self, user_id: &str) -> Result<Option<AdminUser>> {
        match tokio::fs::read_to_string(self.user_path(user_id)).await {
            Ok(content) => {
                let user = serde_json::from_str(&content)
                    .map_err(|e| AuthError::Encoding(e.to_string()))?;
                Ok(Some(user))
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, user: &AdminUser) -> Result<()> {
        let content = serde_json::to_string_pretty(user)
            .map_err(|e| AuthError::Encoding(e.to_string()))?;
        tokio::fs::write(self.user_path(&user.user_id), content).await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.user_path(user_id)).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    async fn all(&self) -> Result<Vec<AdminUser>> {
        let mut users = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(users),
            Err(error) => return Err(error.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("auth") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str(&content) {
                Ok(user) => users.push(user),
                Err(error) => {
                    log::warn!("skipping unreadable auth record {path:?}: {error}");
                }
            }
        }
        Ok(users)
    }
}
