//! Session handling for the Podium framework.
//!
//! A [`SessionHandler`] is the storage seam (file spool or SQLite table), a
//! [`Session`] is the per-request key/value map, and the [`SessionManager`]
//! moves one through the other. Backends are picked with [`SessionConfig`].

pub mod config;
#[cfg(feature = "database")]
pub mod database_session;
pub mod error;
pub mod file_session;
pub mod handler;
pub mod session;

pub use config::{SessionBackend, SessionConfig};
#[cfg(feature = "database")]
pub use database_session::DatabaseSessionHandler;
pub use error::{Result, SessionError};
pub use file_session::FileSessionHandler;
pub use handler::{SessionHandler, generate_session_id};
pub use session::{Session, SessionManager};
