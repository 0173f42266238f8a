// AdminAuth: login state machine and user administration

use crate::error::{AuthError, Result};
use crate::gate::AccessRequirement;
use crate::password::PasswordHasher;
use crate::rank::{Category, Level};
use crate::storage::AdminStorage;
use crate::user::{AdminUser, hashed_user_id};
use chrono::Utc;
use podium_log::LogWriter;
use podium_session::Session;
use std::sync::Arc;

/// Session key for the hashed user id.
pub const KEY_ID: &str = "Id";
/// Session key for the numeric category code.
pub const KEY_CATEGORY: &str = "Category";
/// Session key for the numeric level.
pub const KEY_LEVEL: &str = "Level";
/// Session key for the login flag, `"1"` while logged in.
pub const KEY_LOGIN: &str = "Login";
/// Session key for the unix timestamp the login expires at.
pub const KEY_LOGIN_EXPIRE: &str = "LoginExpire";

/// Admin authentication against an [`AdminStorage`].
///
/// Login state lives in the session under the keys above, so any session
/// backend carries it. Bootstrap credentials, when configured, are honored
/// only while the storage has no registered user at all; the first real
/// registration annuls them.
pub struct AdminAuth {
    storage: Arc<dyn AdminStorage>,
    hasher: PasswordHasher,
    login_expire_secs: u64,
    initial_credentials: Option<(String, String)>,
    disabled: bool,
    admin_log: Option<LogWriter>,
}

impl AdminAuth {
    pub fn new(
        storage: Arc<dyn AdminStorage>,
        hasher: PasswordHasher,
        login_expire_secs: u64,
    ) -> Self {
        Self {
            storage,
            hasher,
            login_expire_secs,
            initial_credentials: None,
            disabled: false,
            admin_log: None,
        }
    }

    /// Configure plaintext bootstrap credentials for the empty-storage case.
    pub fn with_initial_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.initial_credentials = Some((user.into(), password.into()));
        self
    }

    /// Turn authentication off entirely. Every login succeeds as a synthetic
    /// master user and every gate passes. Development aid only.
    pub fn with_auth_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Attach the admin operation log.
    pub fn with_admin_log(mut self, writer: LogWriter) -> Self {
        self.admin_log = Some(writer);
        self
    }

    pub fn storage(&self) -> &Arc<dyn AdminStorage> {
        &self.storage
    }

    fn log(&self, line: impl AsRef<str>) {
        if let Some(writer) = &self.admin_log {
            if let Err(error) = writer.write(line.as_ref()) {
                log::warn!("admin log write failed: {error}");
            }
        }
    }

    async fn load_required(&self, login_id: &str) -> Result<AdminUser> {
        self.storage
            .load(&hashed_user_id(login_id))
            .await?
            .ok_or_else(|| AuthError::UserNotFound(login_id.to_string()))
    }

    fn mark_logged_in(&self, session: &mut Session, id: &str, category: Category, level: Level) {
        let expire = Utc::now().timestamp() + self.login_expire_secs as i64;
        session.set(KEY_ID, id);
        session.set(KEY_CATEGORY, category.code().to_string());
        session.set(KEY_LEVEL, level.value().to_string());
        session.set(KEY_LOGIN, "1");
        session.set(KEY_LOGIN_EXPIRE, expire.to_string());
    }

    fn clear_login(&self, session: &mut Session) {
        for key in [KEY_ID, KEY_CATEGORY, KEY_LEVEL, KEY_LOGIN, KEY_LOGIN_EXPIRE] {
            session.remove(key);
        }
    }

    // ------------------------------------------------------------------
    // Login state
    // ------------------------------------------------------------------

    /// Authenticate and mark the session logged in.
    pub async fn login(
        &self,
        session: &mut Session,
        login_id: &str,
        password: &str,
    ) -> Result<()> {
        let hashed = hashed_user_id(login_id);
        if self.disabled {
            self.mark_logged_in(session, &hashed, Category::Devel, Level::MASTER);
            self.log(format!("login {login_id} (auth disabled)"));
            return Ok(());
        }
        match self.storage.load(&hashed).await? {
            Some(user) => {
                if user.stop_flag {
                    return Err(AuthError::LoginStopped(login_id.to_string()));
                }
                if user.is_lapsed(Utc::now()) {
                    return Err(AuthError::RightsLapsed(login_id.to_string()));
                }
                if !self.hasher.verify(password, &user.password)? {
                    return Err(AuthError::InvalidCredentials);
                }
                self.mark_logged_in(session, &user.user_id, user.category, user.level);
                self.log(format!("login {login_id}"));
                Ok(())
            }
            None => {
                // Bootstrap path: only while nobody is registered yet.
                let bootstrap_ok = match &self.initial_credentials {
                    Some((user, pass)) if user == login_id && pass == password => {
                        !self.storage.is_initialized().await?
                    }
                    _ => false,
                };
                if !bootstrap_ok {
                    return Err(AuthError::InvalidCredentials);
                }
                // The synthetic identity is a Devel master: a Both-category
                // user passes only Both-category gates, which would lock the
                // bootstrap admin out of every categorized screen.
                self.mark_logged_in(session, &hashed, Category::Devel, Level::MASTER);
                self.log(format!("bootstrap login {login_id}"));
                Ok(())
            }
        }
    }

    /// Drop the login state from the session.
    pub fn logout(&self, session: &mut Session) {
        let id = session.get(KEY_ID).unwrap_or("-").to_string();
        self.clear_login(session);
        self.log(format!("logout {id}"));
    }

    /// Whether the session carries the login flag. Does not touch expiry.
    pub fn is_logged_in(&self, session: &Session) -> bool {
        session.get(KEY_LOGIN) == Some("1")
    }

    /// Validate the login expiry, sliding it forward when still valid.
    /// An expired login is cleared from the session.
    pub fn check_login_expire(&self, session: &mut Session) -> bool {
        if !self.is_logged_in(session) {
            return false;
        }
        let expire: i64 = match session.get(KEY_LOGIN_EXPIRE).and_then(|v| v.parse().ok()) {
            Some(expire) => expire,
            None => {
                self.clear_login(session);
                return false;
            }
        };
        let now = Utc::now().timestamp();
        if now > expire {
            self.clear_login(session);
            return false;
        }
        session.set(
            KEY_LOGIN_EXPIRE,
            (now + self.login_expire_secs as i64).to_string(),
        );
        true
    }

    /// Whether the session may pass `requirement`. Checks login, expiry and
    /// the category/level gate.
    pub fn check_auth(&self, session: &mut Session, requirement: AccessRequirement) -> bool {
        if self.disabled {
            return true;
        }
        if !self.check_login_expire(session) {
            return false;
        }
        let category = session
            .get(KEY_CATEGORY)
            .and_then(|v| v.parse().ok())
            .and_then(Category::from_code);
        let level = session
            .get(KEY_LEVEL)
            .and_then(|v| v.parse().ok())
            .map(Level::new);
        match (category, level) {
            (Some(category), Some(level)) => requirement.permits(category, level),
            _ => false,
        }
    }

    /// Whether `user` may pass `requirement`, independent of any session.
    pub fn check_user_auth(&self, user: &AdminUser, requirement: AccessRequirement) -> bool {
        !user.stop_flag
            && !user.is_lapsed(Utc::now())
            && requirement.permits(user.category, user.level)
    }

    /// The stored user behind the session's login, if any.
    pub async fn current_user(&self, session: &Session) -> Result<Option<AdminUser>> {
        match session.get(KEY_ID) {
            Some(id) => self.storage.load(id).await,
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // User administration
    // ------------------------------------------------------------------

    /// Whether a user is already registered under `login_id`.
    pub async fn check_duplicate(&self, login_id: &str) -> Result<bool> {
        Ok(self.storage.load(&hashed_user_id(login_id)).await?.is_some())
    }

    /// Register a new administrator. The first registration annuls any
    /// bootstrap credentials, since the storage is initialized from then on.
    pub async fn register(
        &self,
        login_id: &str,
        password: &str,
        category: Category,
        level: Level,
    ) -> Result<AdminUser> {
        if self.check_duplicate(login_id).await? {
            return Err(AuthError::DuplicateUser(login_id.to_string()));
        }
        let hash = self.hasher.hash(password)?;
        let user = AdminUser::new(login_id, hash, category, level);
        self.storage.save(&user).await?;
        self.log(format!("register {login_id} ({} L{})", category, level));
        Ok(user)
    }

    /// Persist changes to an existing user.
    pub async fn update(&self, user: &AdminUser) -> Result<()> {
        if self.storage.load(&user.user_id).await?.is_none() {
            return Err(AuthError::UserNotFound(user.login_id().to_string()));
        }
        self.storage.save(user).await?;
        self.log(format!("update {}", user.login_id()));
        Ok(())
    }

    /// Change a password, verifying the current one first.
    pub async fn change_password(
        &self,
        login_id: &str,
        current: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.load_required(login_id).await?;
        if !self.hasher.verify(current, &user.password)? {
            return Err(AuthError::InvalidCredentials);
        }
        self.force_change_password(login_id, new_password).await
    }

    /// Change a password without verifying the current one. For operators
    /// resetting somebody else's account.
    pub async fn force_change_password(&self, login_id: &str, new_password: &str) -> Result<()> {
        let mut user = self.load_required(login_id).await?;
        user.password = self.hasher.hash(new_password)?;
        self.storage.save(&user).await?;
        self.log(format!("change_password {login_id}"));
        Ok(())
    }

    /// Reassign category and level.
    pub async fn change_level(
        &self,
        login_id: &str,
        category: Category,
        level: Level,
    ) -> Result<()> {
        let mut user = self.load_required(login_id).await?;
        user.category = category;
        user.level = level;
        self.storage.save(&user).await?;
        self.log(format!("change_level {login_id} ({category} L{level})"));
        Ok(())
    }

    /// Merge entries into the profile. Existing keys are overwritten.
    pub async fn change_profile(
        &self,
        login_id: &str,
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Result<()> {
        let mut user = self.load_required(login_id).await?;
        for (key, value) in entries {
            user.profile.insert(key, value);
        }
        self.storage.save(&user).await?;
        self.log(format!("change_profile {login_id}"));
        Ok(())
    }

    /// Expel a user: lapse their rights as of now. The record stays, so the
    /// roster keeps its history and the id cannot be re-registered by
    /// accident.
    pub async fn expel(&self, login_id: &str) -> Result<()> {
        let mut user = self.load_required(login_id).await?;
        user.lapse_date = Some(Utc::now());
        self.storage.save(&user).await?;
        self.log(format!("expel {login_id}"));
        Ok(())
    }

    /// Stop a user from logging in without removing the record.
    pub async fn auth_stop(&self, login_id: &str) -> Result<()> {
        self.set_stop_flag(login_id, true).await
    }

    /// Lift a stop.
    pub async fn auth_start(&self, login_id: &str) -> Result<()> {
        self.set_stop_flag(login_id, false).await
    }

    async fn set_stop_flag(&self, login_id: &str, stop: bool) -> Result<()> {
        let mut user = self.load_required(login_id).await?;
        user.stop_flag = stop;
        self.storage.save(&user).await?;
        self.log(format!(
            "{} {login_id}",
            if stop { "auth_stop" } else { "auth_start" }
        ));
        Ok(())
    }

    /// Users ordered by registration date, windowed by `offset` and `length`.
    pub async fn all_users(
        &self,
        offset: usize,
        length: Option<usize>,
    ) -> Result<Vec<AdminUser>> {
        let mut users = self.storage.all().await?;
        users.sort_by_key(|user| user.create_date);
        let windowed: Vec<AdminUser> = match length {
            Some(length) => users.into_iter().skip(offset).take(length).collect(),
            None => users.into_iter().skip(offset).collect(),
        };
        Ok(windowed)
    }
}
