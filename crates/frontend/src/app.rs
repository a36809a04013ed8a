//! Application root
//!
//! [`App`] owns the auth context, the router and whichever screen is mounted.
//! Session changes arrive as [`AuthEvent`]s and are turned into navigation
//! here; screens only ever return the route they want next.

use crate::auth::AuthContext;
use crate::pages::{HomePage, LoginPage};
use crate::prompt::Confirm;
use crate::routes::{Route, Router};
use portal_http::AuthEvent;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// The mounted screen
#[derive(Debug, Clone)]
pub enum Screen {
    Login(LoginPage),
    Home(HomePage),
}

impl Screen {
    fn for_route(route: Route) -> Self {
        match route {
            Route::Login => Self::Login(LoginPage::new()),
            Route::Home => Self::Home(HomePage::new()),
        }
    }

    pub fn route(&self) -> Route {
        match self {
            Self::Login(_) => Route::Login,
            Self::Home(_) => Route::Home,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Login(page) => page.render(),
            Self::Home(page) => page.render(),
        }
    }
}

pub struct App {
    auth: AuthContext,
    router: Router,
    screen: Screen,
    events: broadcast::Receiver<AuthEvent>,
}

impl App {
    /// Open the app at `path`, applying redirects until a screen settles
    pub fn start(auth: AuthContext, path: &str) -> Self {
        let events = auth.subscribe();
        let route = Route::resolve(path, auth.is_authenticated());
        debug!(path, %route, "starting app");

        let mut app = Self {
            router: Router::new(route),
            screen: Screen::for_route(route),
            auth,
            events,
        };
        app.mount();
        app
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn route(&self) -> Route {
        self.router.current()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn login_page_mut(&mut self) -> Option<&mut LoginPage> {
        match &mut self.screen {
            Screen::Login(page) => Some(page),
            Screen::Home(_) => None,
        }
    }

    pub fn home_page(&self) -> Option<&HomePage> {
        match &self.screen {
            Screen::Home(page) => Some(page),
            Screen::Login(_) => None,
        }
    }

    /// Navigate to `route` after the auth guard. Navigating to the current
    /// route keeps the mounted screen as it is.
    pub fn navigate(&mut self, route: Route) -> bool {
        let route = route.guard(self.auth.is_authenticated());
        if !self.router.navigate(route) {
            return false;
        }
        self.screen = Screen::for_route(route);
        self.mount();
        true
    }

    /// Navigate by path, as if typed into the address bar
    pub fn open(&mut self, path: &str) -> bool {
        self.navigate(Route::resolve(path, self.auth.is_authenticated()))
    }

    /// Remount the current route from the stored session
    pub fn reload(&mut self) {
        let route = self.router.current().guard(self.auth.is_authenticated());
        self.router.navigate(route);
        self.screen = Screen::for_route(route);
        self.mount();
    }

    /// Drain pending auth events and route on them. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "auth events dropped, resyncing with session");
                    self.reload();
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        handled
    }

    fn handle_event(&mut self, event: AuthEvent) {
        debug!(?event, "handling auth event");
        match event {
            AuthEvent::SessionExpired | AuthEvent::LoggedOut => {
                self.navigate(Route::Login);
            }
            AuthEvent::LoggedIn { .. } => {
                self.navigate(Route::Home);
            }
        }
    }

    /// Submit the login form if it is mounted
    pub async fn submit_login(&mut self) {
        let Some(credentials) = self.login_page_mut().and_then(LoginPage::begin_submit) else {
            return;
        };

        let result = self.auth.login(&credentials).await;
        self.process_events();

        let redirect = match &mut self.screen {
            Screen::Login(page) => page.finish_submit(result),
            Screen::Home(_) => {
                debug!("login finished after leaving the login screen");
                None
            }
        };
        if let Some(route) = redirect {
            self.navigate(route);
        }
    }

    /// Refresh the profile shown on the home screen
    pub async fn refresh_home(&mut self) {
        let redirect = match &mut self.screen {
            Screen::Home(page) => page.refresh(&self.auth).await,
            Screen::Login(_) => return,
        };
        self.settle(redirect);
    }

    /// Log out from the home screen, asking `confirm` first
    pub async fn logout(&mut self, confirm: &dyn Confirm) {
        let redirect = match &mut self.screen {
            Screen::Home(page) => page.logout(&self.auth, confirm).await,
            Screen::Login(_) => return,
        };
        self.settle(redirect);
    }

    pub fn render(&self) -> String {
        self.screen.render()
    }

    fn settle(&mut self, redirect: Option<Route>) {
        self.process_events();
        if let Some(route) = redirect {
            self.navigate(route);
        }
    }

    fn mount(&mut self) {
        loop {
            let redirect = match &mut self.screen {
                Screen::Login(page) => page.mount(&self.auth),
                Screen::Home(page) => page.mount(&self.auth),
            };
            match redirect {
                Some(route) if self.router.navigate(route) => {
                    self.screen = Screen::for_route(route);
                }
                _ => break,
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("auth", &self.auth)
            .field("router", &self.router)
            .field("screen", &self.screen)
            .finish_non_exhaustive()
    }
}
