// Typed settings deserialized from the application config file

use crate::error::{ConfigError, Result};
use podium_core::{DispatchConfig, HookConfigEntry, HookKind, Phase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// The whole application configuration.
///
/// Known sections are typed; anything else lands in the `extra` overflow map
/// so application-specific settings can live in the same file without the
/// framework knowing about them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dispatch: DispatchSettings,
    pub session: SessionSettings,
    pub admin: AdminSettings,
    #[serde(rename = "hook")]
    pub hooks: Vec<HookSettings>,
    #[serde(flatten)]
    pub extra: HashMap<String, toml::Value>,
}

/// The `[dispatch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub admin_dir: String,
    pub default_page: String,
    pub admin_default_page: String,
    pub error_pages: HashMap<String, String>,
    pub public_path: PathBuf,
    pub resource_path: PathBuf,
    pub log_directory: PathBuf,
    pub access_log: bool,
    pub sql_log: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        let base = DispatchConfig::default();
        Self {
            admin_dir: base.admin_dir,
            default_page: base.default_page,
            admin_default_page: base.admin_default_page,
            error_pages: base.error_pages,
            public_path: base.public_path,
            resource_path: base.resource_path,
            log_directory: base.log_directory,
            access_log: base.access_log,
            sql_log: base.sql_log,
        }
    }
}

impl DispatchSettings {
    pub fn to_dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            admin_dir: self.admin_dir.clone(),
            default_page: self.default_page.clone(),
            admin_default_page: self.admin_default_page.clone(),
            error_pages: self.error_pages.clone(),
            public_path: self.public_path.clone(),
            resource_path: self.resource_path.clone(),
            log_directory: self.log_directory.clone(),
            access_log: self.access_log,
            sql_log: self.sql_log,
        }
    }
}

/// The `[session]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// `file`, `database` or `cache`.
    pub backend: String,
    /// Directory for the file backend.
    pub directory: PathBuf,
    /// SQLite file for the database backend.
    pub database_path: PathBuf,
    /// Seconds a session stays valid.
    pub lifetime_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            backend: "file".to_string(),
            directory: PathBuf::from("sessions"),
            database_path: PathBuf::from("podium.db"),
            lifetime_secs: 1800,
        }
    }
}

/// The `[admin]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// `file` or `database`.
    pub storage: String,
    /// Directory for the file storage.
    pub directory: PathBuf,
    /// SQLite file for the database storage.
    pub database_path: PathBuf,
    /// Bootstrap credentials, honored only until a real user is registered.
    pub initial_user: String,
    pub initial_password: String,
    /// Seconds an admin login stays valid.
    pub login_expire_secs: u64,
    /// Whether admin operations are logged to the admin channel.
    pub admin_log: bool,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            storage: "file".to_string(),
            directory: PathBuf::from("auth"),
            database_path: PathBuf::from("podium.db"),
            initial_user: String::new(),
            initial_password: String::new(),
            login_expire_secs: 3600,
            admin_log: false,
        }
    }
}

/// One `[[hook]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSettings {
    pub phase: String,
    /// `exec` or `new`.
    pub action: String,
    pub target: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl HookSettings {
    /// Convert to the core's binding entry, validating phase and action.
    pub fn to_entry(&self) -> Result<HookConfigEntry> {
        let phase = Phase::parse(&self.phase)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown hook phase {:?}", self.phase)))?;
        let kind = HookKind::parse(&self.action).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown hook action {:?}", self.action))
        })?;
        Ok(HookConfigEntry {
            phase,
            kind,
            target: self.target.clone(),
            params: self.params.clone(),
            enabled: self.enabled,
        })
    }
}
