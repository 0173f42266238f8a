// Configuration loading for the Podium framework

pub mod error;
pub mod settings;

pub use error::{ConfigError, Result};
pub use settings::{AdminSettings, DispatchSettings, HookSettings, SessionSettings, Settings};

use podium_core::{DispatchConfig, HookConfigEntry};
use serde::de::DeserializeOwned;
use std::env;
use std::path::Path;

/// Environment variables override the file, prefixed `PODIUM_`.
const ENV_PREFIX: &str = "PODIUM_";

/// Loaded application configuration.
///
/// Typically built with [`load`](Self::load): `.env` first (missing is fine),
/// then the TOML file named by `PODIUM_CONFIG` (default `podium.toml`,
/// missing file means pure defaults), then `PODIUM_*` environment overrides
/// on top.
#[derive(Clone)]
pub struct ConfigService {
    settings: Settings,
}

impl ConfigService {
    /// Load with the standard precedence described on the type.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = env::var("PODIUM_CONFIG").unwrap_or_else(|_| "podium.toml".to_string());
        let mut service = if Path::new(&path).is_file() {
            Self::from_file(&path)?
        } else {
            Self::from_settings(Settings::default())
        };
        service.apply_env_overrides();
        Ok(service)
    }

    /// Load from a TOML file, without environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(Self { settings })
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Dispatch configuration for the core.
    pub fn dispatch_config(&self) -> DispatchConfig {
        self.settings.dispatch.to_dispatch_config()
    }

    pub fn session(&self) -> &SessionSettings {
        &self.settings.session
    }

    pub fn admin(&self) -> &AdminSettings {
        &self.settings.admin
    }

    /// Validated hook binding entries for the core.
    pub fn hook_entries(&self) -> Result<Vec<HookConfigEntry>> {
        self.settings.hooks.iter().map(HookSettings::to_entry).collect()
    }

    /// Read a value from the overflow map, deserialized to `T`.
    pub fn extra<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.settings.extra.get(key)?.clone();
        value.try_into().ok()
    }

    /// Whether the overflow map carries `key`.
    pub fn has_extra(&self, key: &str) -> bool {
        self.settings.extra.contains_key(key)
    }

    fn apply_env_overrides(&mut self) {
        let dispatch = &mut self.settings.dispatch;
        if let Some(value) = env_override("ADMIN_DIR") {
            dispatch.admin_dir = value;
        }
        if let Some(value) = env_override("DEFAULT_PAGE") {
            dispatch.default_page = value;
        }
        if let Some(value) = env_override("ADMIN_DEFAULT_PAGE") {
            dispatch.admin_default_page = value;
        }
        if let Some(value) = env_override("PUBLIC_PATH") {
            dispatch.public_path = value.into();
        }
        if let Some(value) = env_override("RESOURCE_PATH") {
            dispatch.resource_path = value.into();
        }
        if let Some(value) = env_override("LOG_DIRECTORY") {
            dispatch.log_directory = value.into();
        }
        if let Some(value) = env_override("ACCESS_LOG") {
            dispatch.access_log = parse_bool(&value);
        }
        if let Some(value) = env_override("SQL_LOG") {
            dispatch.sql_log = parse_bool(&value);
        }
        if let Some(value) = env_override("SESSION_BACKEND") {
            self.settings.session.backend = value;
        }
        if let Some(value) = env_override("SESSION_DIRECTORY") {
            self.settings.session.directory = value.into();
        }
        if let Some(value) = env_override("ADMIN_STORAGE") {
            self.settings.admin.storage = value;
        }
        if let Some(value) = env_override("ADMIN_DIRECTORY") {
            self.settings.admin.directory = value.into();
        }
    }
}

fn env_override(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{name}")).ok()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_core::Phase;

    const SAMPLE: &str = r#"
[dispatch]
admin_dir = "backoffice"
default_page = "home"
access_log = true

[dispatch.error_pages]
HTTP404 = "not_found.html"

[session]
backend = "database"
database_path = "state/podium.db"
lifetime_secs = 600

[admin]
storage = "file"
directory = "state/auth"
initial_user = "root"
initial_password = "changeme"

[[hook]]
phase = "initial"
action = "exec"
target = "audit"

[[hook]]
phase = "final"
action = "new"
target = "mailer"
enabled = false

[hook_params_demo]
anything = "goes"
"#;

    #[test]
    fn test_parse_sections() {
        let config = ConfigService::from_toml(SAMPLE).unwrap();
        let dispatch = config.dispatch_config();
        assert_eq!(dispatch.admin_dir, "backoffice");
        assert_eq!(dispatch.default_page, "home");
        assert!(dispatch.access_log);
        assert_eq!(
            dispatch.error_page(404),
            Some(std::path::PathBuf::from("resource/HttpStatus/not_found.html"))
        );

        assert_eq!(config.session().backend, "database");
        assert_eq!(config.session().lifetime_secs, 600);
        assert_eq!(config.admin().initial_user, "root");
    }

    #[test]
    fn test_hook_entries() {
        let config = ConfigService::from_toml(SAMPLE).unwrap();
        let entries = config.hook_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phase, Phase::Initial);
        assert!(entries[0].enabled);
        assert_eq!(entries[1].phase, Phase::Final);
        assert!(!entries[1].enabled);
    }

    #[test]
    fn test_overflow_map() {
        let config = ConfigService::from_toml(SAMPLE).unwrap();
        assert!(config.has_extra("hook_params_demo"));

        #[derive(serde::Deserialize)]
        struct Demo {
            anything: String,
        }
        let demo: Demo = config.extra("hook_params_demo").unwrap();
        assert_eq!(demo.anything, "goes");
        assert!(!config.has_extra("missing"));
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config = ConfigService::from_toml("").unwrap();
        assert_eq!(config.dispatch_config().admin_dir, "pwfadmin");
        assert!(config.hook_entries().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_hook_phase_rejected() {
        let config = ConfigService::from_toml(
            r#"
[[hook]]
phase = "warmup"
action = "exec"
target = "x"
"#,
        )
        .unwrap();
        assert!(config.hook_entries().is_err());
    }
}
