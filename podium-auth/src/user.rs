// Admin user record

use crate::rank::{Category, Level};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Profile key for the plain login id.
pub const PROFILE_LID: &str = "lid";
/// Profile key for the display name.
pub const PROFILE_NAME: &str = "name";
/// Profile key for the mail address.
pub const PROFILE_MAIL: &str = "mail";

/// Stored identity for the login id: SHA-256 hex. Storage never sees the
/// plain id outside the profile.
pub fn hashed_user_id(login_id: &str) -> String {
    hex::encode(Sha256::digest(login_id.as_bytes()))
}

/// One administrator.
///
/// `user_id` is the hashed login id and doubles as the storage key.
/// `password` holds a bcrypt or argon2 hash, never a plain password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub user_id: String,
    pub password: String,
    pub category: Category,
    pub level: Level,
    #[serde(default)]
    pub profile: BTreeMap<String, String>,
    pub create_date: DateTime<Utc>,
    #[serde(default)]
    pub lapse_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stop_flag: bool,
}

impl AdminUser {
    pub fn new(
        login_id: &str,
        password_hash: impl Into<String>,
        category: Category,
        level: Level,
    ) -> Self {
        let mut profile = BTreeMap::new();
        profile.insert(PROFILE_LID.to_string(), login_id.to_string());
        Self {
            user_id: hashed_user_id(login_id),
            password: password_hash.into(),
            category,
            level,
            profile,
            create_date: Utc::now(),
            lapse_date: None,
            stop_flag: false,
        }
    }

    /// Plain login id, kept in the profile.
    pub fn login_id(&self) -> &str {
        self.profile
            .get(PROFILE_LID)
            .map(String::as_str)
            .unwrap_or(&self.user_id)
    }

    /// Whether the rights have lapsed as of `now`.
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.lapse_date.is_some_and(|lapse| lapse <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_hashed_id_is_stable_sha256() {
        let a = hashed_user_id("alice");
        assert_eq!(a, hashed_user_id("alice"));
        assert_ne!(a, hashed_user_id("bob"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_new_user_keeps_login_id_in_profile() {
        let user = AdminUser::new("alice", "$2b$fake", Category::Manage, Level::EDITOR);
        assert_eq!(user.login_id(), "alice");
        assert_eq!(user.user_id, hashed_user_id("alice"));
        assert!(!user.stop_flag);
        assert!(user.lapse_date.is_none());
    }

    #[test]
    fn test_lapse_boundary() {
        let mut user = AdminUser::new("alice", "x", Category::Both, Level::BOTTOM);
        let now = Utc::now();
        assert!(!user.is_lapsed(now));

        user.lapse_date = Some(now - Duration::seconds(1));
        assert!(user.is_lapsed(now));

        user.lapse_date = Some(now + Duration::hours(1));
        assert!(!user.is_lapsed(now));
    }

    #[test]
    fn test_json_roundtrip() {
        let user = AdminUser::new("alice", "hash", Category::Devel, Level::MASTER);
        let json = serde_json::to_string(&user).unwrap();
        let restored: AdminUser = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, user);
        // Category travels as its numeric code.
        assert!(json.contains("\"category\":1"));
    }
}
