//! Route table and section switching.
//!
//! `/` is gated: without a signed-in user it resolves to `/login`.

use crate::core::auth::{AuthLogic, Session};
use crate::errors::{AppError, AppResult};
use crate::models::user::User;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Home => "/",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim() {
            "/login" | "login" => Some(Route::Login),
            "/signup" | "signup" => Some(Route::Signup),
            "/" | "home" => Some(Route::Home),
            _ => None,
        }
    }
}

/// Index-addressed sections of the home route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Dashboard,
    Developers,
    Chatbot,
    Settings,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Dashboard,
        Section::Developers,
        Section::Chatbot,
        Section::Settings,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            Section::Dashboard => 0,
            Section::Developers => 1,
            Section::Chatbot => 2,
            Section::Settings => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Developers => "Developers",
            Section::Chatbot => "Chatbot",
            Section::Settings => "Settings",
        }
    }

    /// Accepts an index (`1`) or a name (`developers`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(i) = s.parse::<usize>() {
            return Self::from_index(i);
        }
        Self::ALL
            .into_iter()
            .find(|sec| sec.title().eq_ignore_ascii_case(s))
    }
}

#[derive(Debug)]
pub struct Navigator {
    session: Session,
    route: Route,
    section: Section,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            route: Route::Login,
            section: Section::Dashboard,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Navigate to `route`, returning where we actually landed.
    pub fn go(&mut self, route: Route) -> Route {
        self.route = match route {
            Route::Home if !self.session.is_authenticated() => Route::Login,
            other => other,
        };
        self.route
    }

    pub fn select(&mut self, index: usize) -> AppResult<Section> {
        self.session.require()?;
        let section = Section::from_index(index)
            .ok_or_else(|| AppError::validation(format!("Unknown section {}", index)))?;
        self.route = Route::Home;
        self.section = section;
        Ok(section)
    }

    pub fn login(&mut self, store: &mut dyn Store, username: &str, password: &str) -> AppResult<&User> {
        let user = AuthLogic::login(store, username, password)?;
        self.session.sign_in(user);
        self.section = Section::Dashboard;
        self.go(Route::Home);
        self.session.require()
    }

    /// Register, then send the user to the login page.
    pub fn signup(
        &mut self,
        store: &mut dyn Store,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> AppResult<User> {
        let user = AuthLogic::register(store, username, email, password, confirm)?;
        self.go(Route::Login);
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.session.sign_out();
        self.section = Section::Dashboard;
        self.go(Route::Login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::store::MemoryStore;

    #[test]
    fn home_is_gated_until_login() {
        let mut store = MemoryStore::new();
        let mut nav = Navigator::new();
        assert_eq!(nav.go(Route::Home), Route::Login);
        assert_eq!(nav.select(1).unwrap_err().kind(), ErrorKind::Unauthorized);

        nav.go(Route::Signup);
        nav.signup(&mut store, "alice", "alice@example.com", "Secret123", "Secret123")
            .unwrap();
        assert_eq!(nav.route(), Route::Login);

        nav.login(&mut store, "alice", "Secret123").unwrap();
        assert_eq!(nav.route(), Route::Home);
        assert_eq!(nav.section(), Section::Dashboard);
        assert_eq!(nav.select(3).unwrap(), Section::Settings);
        assert!(nav.select(9).is_err());

        nav.logout();
        assert_eq!(nav.route(), Route::Login);
        assert_eq!(nav.go(Route::Home), Route::Login);
    }

    #[test]
    fn sections_parse_by_index_or_name() {
        assert_eq!(Section::parse("2"), Some(Section::Chatbot));
        assert_eq!(Section::parse("developers"), Some(Section::Developers));
        assert_eq!(Section::parse("7"), None);
        assert_eq!(Route::from_path("/signup"), Some(Route::Signup));
        assert_eq!(Route::from_path("/admin"), None);
    }
}
