// Session value map and the manager that drives a handler

use crate::error::{Result, SessionError};
use crate::handler::{SessionHandler, generate_session_id};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One session: an id plus a string key/value map, serialized as JSON for
/// storage. Keys are ordered so the stored payload is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl Session {
    /// Fresh session with a generated id.
    pub fn new() -> Self {
        Self::with_id(generate_session_id())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
            dirty: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
        self.dirty = true;
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.values.is_empty() {
            self.dirty = true;
        }
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the session changed since decode.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Serialize the value map for storage.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(&self.values).map_err(|e| SessionError::Encoding(e.to_string()))
    }

    /// Rebuild a session from a stored payload. An empty payload is an empty
    /// session.
    pub fn decode(id: impl Into<String>, payload: &str) -> Result<Self> {
        let values = if payload.is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(payload).map_err(|e| SessionError::Encoding(e.to_string()))?
        };
        Ok(Self {
            id: id.into(),
            values,
            dirty: false,
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads and saves sessions through a [`SessionHandler`].
#[derive(Clone)]
pub struct SessionManager {
    handler: Arc<dyn SessionHandler>,
    lifetime_secs: u64,
}

impl SessionManager {
    pub fn new(handler: Arc<dyn SessionHandler>, lifetime_secs: u64) -> Self {
        Self {
            handler,
            lifetime_secs,
        }
    }

    pub fn handler(&self) -> &Arc<dyn SessionHandler> {
        &self.handler
    }

    /// Open the backend. Call once at boot.
    pub async fn open(&self) -> Result<()> {
        self.handler.open().await
    }

    /// Resume the session behind `id`, or start a fresh one when `id` is
    /// `None` or the stored payload is gone.
    pub async fn start(&self, id: Option<&str>) -> Result<Session> {
        match id {
            Some(id) => {
                let payload = self.handler.read(id).await?;
                Session::decode(id, &payload)
            }
            None => Ok(Session::new()),
        }
    }

    /// Persist the session.
    pub async fn save(&self, session: &Session) -> Result<()> {
        self.handler.write(session.id(), &session.encode()?).await
    }

    /// Drop the stored session.
    pub async fn destroy(&self, session: &Session) -> Result<()> {
        self.handler.destroy(session.id()).await
    }

    /// Collect expired sessions.
    pub async fn gc(&self) -> Result<usize> {
        self.handler.gc(self.lifetime_secs).await
    }
}
