// Admin storage selection

use crate::error::Result;
use crate::file_storage::FileAdminStorage;
use crate::storage::AdminStorage;
use std::path::PathBuf;
use std::sync::Arc;

/// Which storage backs the admin records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStorageKind {
    File,
    Sqlite,
}

impl AdminStorageKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "file" => Some(AdminStorageKind::File),
            "sqlite" | "database" | "db" => Some(AdminStorageKind::Sqlite),
            _ => None,
        }
    }
}

/// Storage settings, resolved with [`build_storage`](Self::build_storage).
#[derive(Debug, Clone)]
pub struct AdminStorageConfig {
    pub kind: AdminStorageKind,
    pub directory: PathBuf,
    pub database_path: PathBuf,
}

impl Default for AdminStorageConfig {
    fn default() -> Self {
        Self {
            kind: AdminStorageKind::File,
            directory: PathBuf::from("auth"),
            database_path: PathBuf::from("podium.db"),
        }
    }
}

impl AdminStorageConfig {
    pub fn build_storage(&self) -> Result<Arc<dyn AdminStorage>> {
        match self.kind {
            AdminStorageKind::File => Ok(Arc::new(FileAdminStorage::new(&self.directory))),
            #[cfg(feature = "sqlite")]
            AdminStorageKind::Sqlite => Ok(Arc::new(crate::sqlite_storage::SqliteAdminStorage::new(
                &self.database_path,
            )?)),
            #[cfg(not(feature = "sqlite"))]
            AdminStorageKind::Sqlite => Err(crate::error::AuthError::Encoding(
                "sqlite storage not compiled in".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(AdminStorageKind::parse("file"), Some(AdminStorageKind::File));
        assert_eq!(
            AdminStorageKind::parse("sqlite"),
            Some(AdminStorageKind::Sqlite)
        );
        assert_eq!(AdminStorageKind::parse("db"), Some(AdminStorageKind::Sqlite));
        assert_eq!(AdminStorageKind::parse("ldap"), None);
    }

    #[test]
    fn test_default_builds() {
        assert!(AdminStorageConfig::default().build_storage().is_ok());
    }
}
