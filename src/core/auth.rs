//! Registration, login and account settings.

use crate::core::password::{hash_password, verify_password};
use crate::errors::{AppError, AppResult};
use crate::models::user::{NewUser, User};
use crate::store::Store;
use crate::utils::validation::{validate_email, validate_password, validate_username};

const DEFAULT_ROLE: &str = "user";

/// The signed-in user, if any. Owned by whoever drives the views;
/// never stored globally.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The current user or `NotAuthenticated`.
    pub fn require(&self) -> AppResult<&User> {
        self.user.as_ref().ok_or(AppError::NotAuthenticated)
    }

    pub fn sign_in(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }
}

fn require_filled(fields: &[&str]) -> AppResult<()> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::validation("All fields are required"));
    }
    Ok(())
}

fn check_email(email: &str) -> AppResult<()> {
    if !validate_email(email) {
        return Err(AppError::validation("Please enter a valid email address"));
    }
    Ok(())
}

pub struct AuthLogic;

impl AuthLogic {
    /// Validate and create an account. The password is stored hashed only.
    pub fn register(
        store: &mut dyn Store,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> AppResult<User> {
        let username = username.trim();
        let email = email.trim();

        require_filled(&[username, email, password, confirm])?;
        validate_username(username)?;
        check_email(email)?;
        validate_password(password)?;
        if password != confirm {
            return Err(AppError::validation("Passwords do not match"));
        }
        if store.identity_taken(username, email, None)? {
            return Err(AppError::validation("Username or email already exists"));
        }

        let user = store.insert_user(&NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role: DEFAULT_ROLE.to_string(),
        })?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and stamp `last_login`. Unknown user and wrong
    /// password are indistinguishable to the caller.
    pub fn login(store: &mut dyn Store, username: &str, password: &str) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation("Please enter username and password"));
        }

        let Some(user) = store.find_user_by_username(username)? else {
            tracing::debug!("login for unknown user");
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            tracing::debug!(user_id = user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let user = store.touch_last_login(user.id)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(user)
    }

    /// Change username/email of the signed-in user and refresh the session.
    pub fn update_identity(
        store: &mut dyn Store,
        session: &mut Session,
        username: &str,
        email: &str,
    ) -> AppResult<User> {
        let current_id = session.require()?.id;
        let username = username.trim();
        let email = email.trim();

        require_filled(&[username, email])?;
        validate_username(username)?;
        check_email(email)?;
        if store.identity_taken(username, email, Some(current_id))? {
            return Err(AppError::validation("Username or email already exists"));
        }

        let user = store.update_identity(current_id, username, email)?;
        session.sign_in(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::store::MemoryStore;

    #[test]
    fn register_then_login_sets_last_login() {
        let mut store = MemoryStore::new();
        let user = AuthLogic::register(
            &mut store,
            "alice",
            "alice@example.com",
            "Secret123",
            "Secret123",
        )
        .unwrap();
        assert!(user.last_login.is_none());
        assert_eq!(user.role, "user");
        assert!(user.password_hash.starts_with("$2b$"));
        assert!(!user.password_hash.contains("Secret123"));

        let logged = AuthLogic::login(&mut store, "alice", "Secret123").unwrap();
        assert!(logged.last_login.is_some());

        let dup = AuthLogic::register(
            &mut store,
            "alice",
            "other@example.com",
            "Secret123",
            "Secret123",
        )
        .unwrap_err();
        assert_eq!(dup.to_string(), "Username or email already exists");
    }

    #[test]
    fn bad_credentials_share_one_message() {
        let mut store = MemoryStore::new();
        AuthLogic::register(&mut store, "bob", "bob@example.com", "Secret123", "Secret123")
            .unwrap();

        let wrong = AuthLogic::login(&mut store, "bob", "Secret999").unwrap_err();
        let unknown = AuthLogic::login(&mut store, "carol", "Secret123").unwrap_err();
        assert_eq!(wrong.to_string(), "Invalid username or password");
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn register_rejects_each_rule() {
        let mut store = MemoryStore::new();
        let cases = [
            ("", "a@b.co", "Secret123", "Secret123", "All fields are required"),
            ("ab", "a@b.co", "Secret123", "Secret123", "at least 3 characters"),
            ("bad name", "a@b.co", "Secret123", "Secret123", "letters, numbers"),
            ("dave", "not-an-email", "Secret123", "Secret123", "valid email"),
            ("dave", "d@b.co", "short1A", "short1A", "at least 8"),
            ("dave", "d@b.co", "secret123", "secret123", "uppercase"),
            ("dave", "d@b.co", "Secret123", "Secret124", "do not match"),
        ];
        for (u, e, p, c, expected) in cases {
            let err = AuthLogic::register(&mut store, u, e, p, c).unwrap_err();
            assert!(err.to_string().contains(expected), "{u}: {err}");
        }
    }

    #[test]
    fn identity_update_needs_a_session_and_free_names() {
        let mut store = MemoryStore::new();
        AuthLogic::register(&mut store, "erin", "erin@example.com", "Secret123", "Secret123")
            .unwrap();
        let frank = AuthLogic::register(
            &mut store,
            "frank",
            "frank@example.com",
            "Secret123",
            "Secret123",
        )
        .unwrap();

        let mut session = Session::new();
        let err = AuthLogic::update_identity(&mut store, &mut session, "x_y", "x@y.io").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        session.sign_in(frank);
        let taken =
            AuthLogic::update_identity(&mut store, &mut session, "erin", "f2@example.com")
                .unwrap_err();
        assert_eq!(taken.to_string(), "Username or email already exists");

        // keeping one's own email is fine
        let renamed =
            AuthLogic::update_identity(&mut store, &mut session, "franky", "frank@example.com")
                .unwrap();
        assert_eq!(renamed.username, "franky");
        assert_eq!(session.user().map(|u| u.username.as_str()), Some("franky"));
    }
}
