//! Application state composition.
//!
//! ```text
//! AppState
//! ├── screen: Screen            (which view is active)
//! ├── session: SessionContext   (cached token + authenticator)
//! ├── auth: AuthState           (login, register, Google forms)
//! ├── directory: DirectoryState (listing, search, detail)
//! ├── task_seq: TaskSeq         (async task id generator)
//! └── tasks: Tasks              (auth / sign-out lifecycle)
//! ```

use roster_core::config::Config;
use roster_core::enrich::Enricher;
use roster_core::session::{Route, SessionContext};

use crate::auth::AuthState;
use crate::common::{TaskSeq, Tasks};
use crate::directory::DirectoryState;

/// The view currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    /// Google sign-in: browser URL plus redirect paste box.
    Federated,
    Directory,
    /// Full record for the selected employee.
    Detail,
}

impl Screen {
    pub fn is_auth(self) -> bool {
        matches!(self, Screen::Login | Screen::Register | Screen::Federated)
    }
}

impl From<Route> for Screen {
    fn from(route: Route) -> Self {
        match route {
            Route::Login => Screen::Login,
            Route::Directory => Screen::Directory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleSettings {
    pub client_id: Option<String>,
    pub redirect_uri: String,
}

pub struct AppState {
    pub screen: Screen,
    pub session: SessionContext,
    pub auth: AuthState,
    pub directory: DirectoryState,
    pub google: GoogleSettings,
    /// Attach the session token as a bearer header on directory fetches.
    pub send_token: bool,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl AppState {
    /// Starts on the directory when a session is cached, on login otherwise.
    pub fn new(config: &Config, session: SessionContext) -> Self {
        let enricher = Enricher::with_optional_seed(config.enrichment.mode, config.enrichment.seed);
        Self {
            screen: session.resolve_initial_route().into(),
            session,
            auth: AuthState::default(),
            directory: DirectoryState::new(enricher),
            google: GoogleSettings {
                client_id: config.identity.google_client_id.clone(),
                redirect_uri: config.identity.google_redirect_uri.clone(),
            },
            send_token: config.directory.send_token,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            should_quit: false,
        }
    }

    /// Something is in flight and the spinner should animate.
    pub fn is_busy(&self) -> bool {
        self.tasks.is_any_running() || self.directory.view.is_refreshing()
    }
}
