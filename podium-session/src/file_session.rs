// File-backed session storage, one sess_<id> file per session

use crate::error::Result;
use crate::handler::SessionHandler;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Sessions as flat files under a spool directory.
pub struct FileSessionHandler {
    directory: PathBuf,
}

impl FileSessionHandler {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn session_path(&self, id: &str) -> PathBuf {
        // Ids come from cookies; strip anything that could walk the tree.
        let safe: String = id.chars().filter(char::is_ascii_alphanumeric).collect();
        self.directory.join(format!("sess_{safe}"))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl SessionHandler for FileSessionHandler {
    async fn open(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn read(&self, id: &str) -> Result<String> {
        match tokio::fs::read_to_string(self.session_path(id)).await {
            Ok(data) => Ok(data),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(error) => Err(error.into()),
        }
    }

    async fn write(&self, id: &str, data: &str) -> Result<()> {
        tokio::fs::write(self.session_path(id), data).await?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        match tokio::fs::remove_file(self.session_path(id)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    async fn gc(&self, max_lifetime_secs: u64) -> Result<usize> {
        let cutoff = SystemTime::now() - Duration::from_secs(max_lifetime_secs);
        let mut collected = 0;
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(error) => return Err(error.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with("sess_") {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.modified()? < cutoff {
                tokio::fs::remove_file(entry.path()).await?;
                collected += 1;
            }
        }
        Ok(collected)
    }
}
