//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, Screen};
use crate::{auth, directory};

/// Effects to run once before the first event.
pub fn start(app: &mut AppState) -> Vec<UiEffect> {
    if app.screen == Screen::Directory {
        directory::enter(app)
    } else {
        vec![]
    }
}

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            if app.is_busy() {
                app.spinner_frame = app.spinner_frame.wrapping_add(1);
            }
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::AuthFinished { task, op, result } => {
            auth::handle_auth_finished(app, task, op, result)
        }
        UiEvent::SignedOut { task, result } => {
            auth::handle_signed_out(app, task, result);
            vec![]
        }
        UiEvent::DirectoryFetched { ticket, result } => {
            directory::handle_fetched(app, ticket, result);
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Paste(text) => {
            if app.screen.is_auth() {
                auth::handle_paste(app, &text);
            } else if app.screen == Screen::Directory {
                directory::handle_paste(app, &text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return vec![UiEffect::Quit];
    }

    match app.screen {
        Screen::Login => auth::handle_login_key(app, key),
        Screen::Register => auth::handle_register_key(app, key),
        Screen::Federated => auth::handle_federated_key(app, key),
        Screen::Directory => directory::handle_key(app, key),
        Screen::Detail => directory::handle_detail_key(app, key),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use roster_core::config::Config;
    use roster_core::error::DirectoryError;
    use roster_core::identity::RestIdentityGateway;
    use roster_core::model::{Address, RawPerson};
    use roster_core::pipeline::FetchTicket;
    use roster_core::session::{Authenticator, SessionContext};
    use roster_core::token_store::{MemoryTokenStore, StoredSession};

    use super::*;
    use crate::common::TaskId;
    use crate::effects::AuthRequest;
    use crate::events::AuthOp;

    fn app_with(store: MemoryTokenStore) -> AppState {
        let gateway = Arc::new(RestIdentityGateway::new("http://127.0.0.1:9", None));
        let auth = Authenticator::new(gateway, Arc::new(store));
        let session = SessionContext::open(auth).unwrap();
        let mut config = Config::default();
        config.enrichment.seed = Some(42);
        AppState::new(&config, session)
    }

    fn signed_out_app() -> AppState {
        app_with(MemoryTokenStore::new())
    }

    fn signed_in_app() -> AppState {
        app_with(MemoryTokenStore::with_session(StoredSession::new(
            "cached-token",
            Some("a@b.co".to_string()),
        )))
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(ch: char) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(
            KeyCode::Char(ch),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_text(app: &mut AppState, text: &str) {
        for ch in text.chars() {
            update(app, key(KeyCode::Char(ch)));
        }
    }

    fn people(names: &[&str]) -> Vec<RawPerson> {
        names
            .iter()
            .zip(1..)
            .map(|(name, id)| RawPerson {
                id,
                name: (*name).to_string(),
                address: Address::default(),
            })
            .collect()
    }

    fn fetch_ticket(effects: &[UiEffect]) -> FetchTicket {
        match effects {
            [UiEffect::FetchDirectory { ticket, .. }] => *ticket,
            other => panic!("expected a single FetchDirectory, got {other:?}"),
        }
    }

    #[test]
    fn test_starts_on_login_without_cached_session() {
        let mut app = signed_out_app();
        assert_eq!(app.screen, Screen::Login);
        assert!(start(&mut app).is_empty());
    }

    #[test]
    fn test_cached_session_starts_on_directory_and_fetches() {
        let mut app = signed_in_app();
        assert_eq!(app.screen, Screen::Directory);

        let effects = start(&mut app);
        fetch_ticket(&effects);
        assert!(app.directory.view.is_initial_load());
    }

    #[test]
    fn test_invalid_login_emits_no_effect() {
        let mut app = signed_out_app();
        type_text(&mut app, "not-an-email");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");

        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(app.auth.login.error.as_deref(), Some("Invalid email"));
        assert!(!app.tasks.auth.is_running());
    }

    #[test]
    fn test_short_password_is_rejected() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.co");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "12345");

        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(
            app.auth.login.error.as_deref(),
            Some("Password min 6 char")
        );
    }

    #[test]
    fn test_valid_login_emits_authenticate() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.co");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");

        let effects = update(&mut app, key(KeyCode::Enter));

        match effects.as_slice() {
            [UiEffect::Authenticate { request, .. }] => assert_eq!(
                request,
                &AuthRequest::Password {
                    email: "a@b.co".to_string(),
                    password: "secret1".to_string(),
                }
            ),
            other => panic!("unexpected effects: {other:?}"),
        }
        assert!(app.auth.login.submitting);
    }

    #[test]
    fn test_register_screen_emits_register_request() {
        let mut app = signed_out_app();
        update(&mut app, ctrl('r'));
        assert_eq!(app.screen, Screen::Register);

        type_text(&mut app, "new@b.co");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");
        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Authenticate {
                request: AuthRequest::Register { .. },
                ..
            }]
        ));

        update(&mut app, key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn test_successful_auth_enters_directory() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.co");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");
        let effects = update(&mut app, key(KeyCode::Enter));
        let [UiEffect::Authenticate { task, .. }] = effects.as_slice() else {
            panic!("expected Authenticate");
        };

        let effects = update(
            &mut app,
            UiEvent::AuthFinished {
                task: *task,
                op: AuthOp::SignIn,
                result: Ok(StoredSession::new("tok", Some("a@b.co".to_string()))),
            },
        );

        assert_eq!(app.screen, Screen::Directory);
        assert_eq!(app.session.cached_token(), Some("tok"));
        assert!(app.auth.login.email.is_empty());
        fetch_ticket(&effects);
    }

    #[test]
    fn test_failed_auth_shows_message_and_stays() {
        let mut app = signed_out_app();
        type_text(&mut app, "a@b.co");
        update(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "secret1");
        let effects = update(&mut app, key(KeyCode::Enter));
        let [UiEffect::Authenticate { task, .. }] = effects.as_slice() else {
            panic!("expected Authenticate");
        };

        update(
            &mut app,
            UiEvent::AuthFinished {
                task: *task,
                op: AuthOp::SignIn,
                result: Err("Wrong password".to_string()),
            },
        );

        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.auth.login.error.as_deref(), Some("Wrong password"));
        assert!(!app.auth.login.submitting);
        assert_eq!(app.auth.login.email.value(), "a@b.co");
    }

    #[test]
    fn test_stale_auth_result_is_ignored() {
        let mut app = signed_out_app();

        let effects = update(
            &mut app,
            UiEvent::AuthFinished {
                task: TaskId(99),
                op: AuthOp::SignIn,
                result: Ok(StoredSession::new("tok", None)),
            },
        );

        assert!(effects.is_empty());
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.session.cached_token(), None);
    }

    fn fill_login(app: &mut AppState) {
        type_text(app, "a@b.co");
        update(app, key(KeyCode::Tab));
        type_text(app, "secret1");
    }

    #[test]
    fn test_abandoned_federated_sign_in_blocks_second_auth() {
        let mut app = signed_out_app();
        update(&mut app, ctrl('g'));
        assert_eq!(app.screen, Screen::Federated);
        update(
            &mut app,
            UiEvent::Terminal(Event::Paste("google-id-token".to_string())),
        );
        let effects = update(&mut app, key(KeyCode::Enter));
        let [UiEffect::Authenticate { task, .. }] = effects.as_slice() else {
            panic!("expected Authenticate, got {effects:?}");
        };
        let task = *task;

        update(&mut app, key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Login);
        fill_login(&mut app);
        let effects = update(&mut app, key(KeyCode::Enter));

        assert!(effects.is_empty());
        assert_eq!(
            app.auth.login.error.as_deref(),
            Some("Sign-in already in progress")
        );
        assert!(!app.auth.login.submitting);

        update(
            &mut app,
            UiEvent::AuthFinished {
                task,
                op: AuthOp::Federated,
                result: Ok(StoredSession::new("idp-token", Some("g@b.co".to_string()))),
            },
        );
        assert_eq!(app.screen, Screen::Directory);
        assert_eq!(app.session.cached_token(), Some("idp-token"));
    }

    #[test]
    fn test_login_waits_for_pending_sign_out() {
        let mut app = signed_in_app();
        fetch_ticket(&start(&mut app));
        let effects = update(&mut app, ctrl('l'));
        let [UiEffect::SignOut { task }] = effects.as_slice() else {
            panic!("expected SignOut, got {effects:?}");
        };
        let task = *task;

        fill_login(&mut app);
        assert!(update(&mut app, key(KeyCode::Enter)).is_empty());
        assert_eq!(
            app.auth.login.error.as_deref(),
            Some("Still signing out, try again in a moment")
        );

        update(
            &mut app,
            UiEvent::SignedOut {
                task,
                result: Ok(()),
            },
        );
        let effects = update(&mut app, key(KeyCode::Enter));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Authenticate {
                request: AuthRequest::Password { .. },
                ..
            }]
        ));
    }

    #[test]
    fn test_fetched_list_is_filtered_and_paged() {
        let mut app = signed_in_app();
        let ticket = fetch_ticket(&start(&mut app));
        let names = [
            "Alice", "Bob", "Alicia", "Carol", "Dave", "Alina", "Eve", "Frank", "Grace", "Heidi",
            "Ivan",
        ];
        update(
            &mut app,
            UiEvent::DirectoryFetched {
                ticket,
                result: Ok(people(&names)),
            },
        );

        let state = app.directory.view.state();
        assert_eq!(state.page_count(), 3);

        update(&mut app, key(KeyCode::End));
        assert_eq!(app.directory.view.state().current_page(), 3);
        update(&mut app, key(KeyCode::Right));
        assert_eq!(app.directory.view.state().current_page(), 3);

        type_text(&mut app, "ali");
        let state = app.directory.view.state();
        assert_eq!(state.current_page(), 1);
        let visible: Vec<&str> = state
            .visible_slice()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(visible, vec!["Alice", "Alicia", "Alina"]);

        update(&mut app, key(KeyCode::Esc));
        assert_eq!(app.directory.view.state().filter_text(), "");
        assert_eq!(app.directory.view.state().filtered_len(), names.len());
    }

    #[test]
    fn test_enter_opens_detail_and_esc_returns() {
        let mut app = signed_in_app();
        let ticket = fetch_ticket(&start(&mut app));
        update(
            &mut app,
            UiEvent::DirectoryFetched {
                ticket,
                result: Ok(people(&["Alice", "Bob"])),
            },
        );

        update(&mut app, key(KeyCode::Down));
        update(&mut app, key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(
            app.directory.detail.as_ref().map(|e| e.name.as_str()),
            Some("Bob")
        );

        update(&mut app, key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Directory);
        assert!(app.directory.detail.is_none());
    }

    #[test]
    fn test_failed_refresh_keeps_previous_list() {
        let mut app = signed_in_app();
        let ticket = fetch_ticket(&start(&mut app));
        update(
            &mut app,
            UiEvent::DirectoryFetched {
                ticket,
                result: Ok(people(&["Alice", "Bob"])),
            },
        );

        let ticket = fetch_ticket(&update(&mut app, key(KeyCode::F(5))));
        update(
            &mut app,
            UiEvent::DirectoryFetched {
                ticket,
                result: Err(DirectoryError::Status { status: 503 }),
            },
        );

        assert_eq!(app.directory.view.state().full_list().len(), 2);
        assert!(app.directory.view.has_error());
    }

    #[test]
    fn test_refresh_while_pending_is_rejected() {
        let mut app = signed_in_app();
        fetch_ticket(&start(&mut app));

        let effects = update(&mut app, key(KeyCode::F(5)));

        assert!(effects.is_empty());
        assert!(app.directory.notice.is_some());
    }

    #[test]
    fn test_sign_out_resets_and_drops_late_fetch() {
        let mut app = signed_in_app();
        let ticket = fetch_ticket(&start(&mut app));

        let effects = update(&mut app, ctrl('l'));

        let [UiEffect::SignOut { task }] = effects.as_slice() else {
            panic!("expected SignOut, got {effects:?}");
        };
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.session.cached_token(), None);

        update(
            &mut app,
            UiEvent::DirectoryFetched {
                ticket,
                result: Ok(people(&["Alice"])),
            },
        );
        assert!(app.directory.view.state().full_list().is_empty());

        update(
            &mut app,
            UiEvent::SignedOut {
                task: *task,
                result: Ok(()),
            },
        );
        assert_eq!(app.auth.notice.as_deref(), Some("Signed out."));
    }

    #[test]
    fn test_bearer_only_sent_when_enabled() {
        let mut app = signed_in_app();
        app.send_token = true;

        let effects = start(&mut app);

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::FetchDirectory { bearer: Some(token), .. }] if token == "cached-token"
        ));
    }

    #[test]
    fn test_paste_goes_to_search() {
        let mut app = signed_in_app();
        update(&mut app, UiEvent::Terminal(Event::Paste("bob".to_string())));
        assert_eq!(app.directory.view.state().filter_text(), "bob");
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = signed_in_app();
        assert_eq!(update(&mut app, ctrl('c')), vec![UiEffect::Quit]);
    }
}
