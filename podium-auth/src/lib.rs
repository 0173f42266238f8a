//! Admin authentication and authorization for the Podium framework.
//!
//! [`AdminAuth`] drives login, logout and the category/level gate against an
//! [`AdminStorage`] backend, with login state carried in the session. See
//! [`AccessRequirement`] for how pages express what they demand.

pub mod config;
pub mod error;
pub mod file_storage;
pub mod gate;
pub mod manager;
pub mod password;
pub mod rank;
#[cfg(feature = "sqlite")]
pub mod sqlite_storage;
pub mod storage;
pub mod user;

pub use config::{AdminStorageConfig, AdminStorageKind};
pub use error::{AuthError, Result};
pub use file_storage::FileAdminStorage;
pub use gate::AccessRequirement;
pub use manager::{
    AdminAuth, KEY_CATEGORY, KEY_ID, KEY_LEVEL, KEY_LOGIN, KEY_LOGIN_EXPIRE,
};
pub use password::{HashAlgorithm, PasswordHasher};
pub use rank::{Category, Level};
#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteAdminStorage;
pub use storage::AdminStorage;
pub use user::{AdminUser, PROFILE_LID, PROFILE_MAIL, PROFILE_NAME, hashed_user_id};
