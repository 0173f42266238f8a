// Dispatch configuration consumed by the request lifecycle

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Settings the dispatcher needs for one application.
///
/// Embedders usually build this from the config layer, but it is a plain
/// struct and can be assembled by hand in tests or small tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// First path segment that addresses the admin namespace.
    pub admin_dir: String,
    /// Controller served for `/`.
    pub default_page: String,
    /// Controller/method served for the bare admin root.
    pub admin_default_page: String,
    /// Static error documents, keyed like `HTTP404`, served from
    /// `resource_path/HttpStatus/`.
    pub error_pages: HashMap<String, String>,
    /// Root for public static documents (the `.html` fallback).
    pub public_path: PathBuf,
    /// Root for framework resources such as error pages.
    pub resource_path: PathBuf,
    /// Directory the channel logs are written under.
    pub log_directory: PathBuf,
    /// Whether the access log channel is open.
    pub access_log: bool,
    /// Whether the SQL log channel is open.
    pub sql_log: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let mut error_pages = HashMap::new();
        error_pages.insert("HTTP404".to_string(), "404.html".to_string());
        Self {
            admin_dir: "pwfadmin".to_string(),
            default_page: "welcome".to_string(),
            admin_default_page: "Top/index".to_string(),
            error_pages,
            public_path: PathBuf::from("public"),
            resource_path: PathBuf::from("resource"),
            log_directory: PathBuf::from("logs"),
            access_log: false,
            sql_log: false,
        }
    }
}

impl DispatchConfig {
    /// Static document configured for `status`, if any.
    pub fn error_page(&self, status: u16) -> Option<PathBuf> {
        self.error_pages
            .get(&format!("HTTP{status}"))
            .map(|page| self.resource_path.join("HttpStatus").join(page))
    }
}
