//! Route table and navigation history

use std::fmt;

/// Screens reachable in the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/login`, public
    Login,
    /// `/home`, requires a session
    Home,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/home",
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Home)
    }

    /// Resolve a path to the screen that should be shown
    ///
    /// `/` goes home when signed in and to login otherwise; unknown paths
    /// fall back to `/`. Protected routes resolve to login without a session.
    pub fn resolve(path: &str, authenticated: bool) -> Self {
        let path = path.trim();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        let route = match path {
            "/login" => Self::Login,
            "/home" => Self::Home,
            _ if authenticated => Self::Home,
            _ => Self::Login,
        };
        route.guard(authenticated)
    }

    /// Apply the auth guard to this route
    pub fn guard(self, authenticated: bool) -> Self {
        if self.requires_auth() && !authenticated {
            Self::Login
        } else {
            self
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Current route plus every navigation that actually happened
#[derive(Debug, Clone)]
pub struct Router {
    current: Route,
    history: Vec<Route>,
}

impl Router {
    pub fn new(initial: Route) -> Self {
        Self {
            current: initial,
            history: vec![initial],
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    /// Move to `route`. Returns false when already there.
    pub fn navigate(&mut self, route: Route) -> bool {
        if self.current == route {
            return false;
        }
        debug!(from = %self.current, to = %route, "navigating");
        self.current = route;
        self.history.push(route);
        true
    }
}
