//! Auth feature reducer.
//!
//! Key handling for the three auth screens and processing of auth results.
//! Input is validated here first so malformed credentials never produce an
//! effect.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster_core::identity::google;
use roster_core::token_store::StoredSession;
use roster_core::validate::validate_credentials;

use super::state::CredentialsForm;
use crate::common::{TaskId, TaskKind, Tasks};
use crate::effects::{AuthRequest, UiEffect};
use crate::events::AuthOp;
use crate::features::directory;
use crate::state::{AppState, Screen};

pub fn handle_login_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Char('r') if ctrl => {
            go_to(app, Screen::Register);
            vec![]
        }
        KeyCode::Char('g') if ctrl => open_federated(app),
        _ if app.auth.login.submitting => vec![],
        KeyCode::Enter => submit_credentials(app, AuthOp::SignIn),
        _ => {
            edit_form(&mut app.auth.login, key);
            vec![]
        }
    }
}

pub fn handle_register_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Esc => {
            go_to(app, Screen::Login);
            vec![]
        }
        _ if app.auth.register.submitting => vec![],
        KeyCode::Enter => submit_credentials(app, AuthOp::Register),
        _ => {
            edit_form(&mut app.auth.register, key);
            vec![]
        }
    }
}

pub fn handle_federated_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            go_to(app, Screen::Login);
            vec![]
        }
        _ if app.auth.federated.submitting => vec![],
        KeyCode::Char('o') if ctrl => app
            .auth
            .federated
            .request
            .as_ref()
            .map(|request| {
                vec![UiEffect::OpenBrowser {
                    url: request.url.clone(),
                }]
            })
            .unwrap_or_default(),
        KeyCode::Enter => submit_federated(app),
        _ => {
            let form = &mut app.auth.federated;
            if form.input.handle_key(key) {
                form.error = None;
            }
            vec![]
        }
    }
}

/// Pasted text goes into the focused field of the current auth screen.
pub fn handle_paste(app: &mut AppState, text: &str) {
    match app.screen {
        Screen::Login => app.auth.login.focused_mut().insert_str(text.trim()),
        Screen::Register => app.auth.register.focused_mut().insert_str(text.trim()),
        Screen::Federated => {
            app.auth.federated.input.set(text.trim());
            app.auth.federated.error = None;
        }
        Screen::Directory | Screen::Detail => {}
    }
}

/// Applies a finished auth task. Results for superseded tasks are dropped.
pub fn handle_auth_finished(
    app: &mut AppState,
    task: TaskId,
    op: AuthOp,
    result: Result<StoredSession, String>,
) -> Vec<UiEffect> {
    if !app.tasks.state_mut(TaskKind::Auth).finish_if_active(task) {
        tracing::debug!(?op, "Ignoring stale auth result");
        return vec![];
    }

    match result {
        Ok(session) => {
            tracing::info!(?op, "Signed in");
            app.session.adopt(session);
            app.auth.reset();
            directory::enter(app)
        }
        Err(message) => {
            match op {
                AuthOp::SignIn => {
                    app.auth.login.submitting = false;
                    app.auth.login.error = Some(message);
                }
                AuthOp::Register => {
                    app.auth.register.submitting = false;
                    app.auth.register.error = Some(message);
                }
                AuthOp::Federated => {
                    app.auth.federated.submitting = false;
                    app.auth.federated.error = Some(message);
                }
            }
            vec![]
        }
    }
}

pub fn handle_signed_out(app: &mut AppState, task: TaskId, result: Result<(), String>) {
    if !app.tasks.state_mut(TaskKind::SignOut).finish_if_active(task) {
        return;
    }
    app.auth.notice = Some(match result {
        Ok(()) => "Signed out.".to_string(),
        Err(message) => format!("Signed out locally: {message}"),
    });
}

fn go_to(app: &mut AppState, screen: Screen) {
    app.auth.notice = None;
    app.auth.login.error = None;
    app.auth.register.error = None;
    app.screen = screen;
}

fn edit_form(form: &mut CredentialsForm, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = form.focus.toggle();
        }
        _ => {
            if form.focused_mut().handle_key(key) {
                form.error = None;
            }
        }
    }
}

fn submit_credentials(app: &mut AppState, op: AuthOp) -> Vec<UiEffect> {
    let form = match op {
        AuthOp::Register => &mut app.auth.register,
        AuthOp::SignIn | AuthOp::Federated => &mut app.auth.login,
    };

    if let Some(busy) = auth_busy(&app.tasks) {
        form.error = Some(busy.to_string());
        return vec![];
    }

    let email = form.email.value().trim().to_string();
    let password = form.password.value().to_string();
    if let Err(err) = validate_credentials(&email, &password) {
        form.error = Some(err.to_string());
        return vec![];
    }
    form.error = None;
    form.submitting = true;

    let request = match op {
        AuthOp::Register => AuthRequest::Register { email, password },
        AuthOp::SignIn | AuthOp::Federated => AuthRequest::Password { email, password },
    };
    start_auth(app, request)
}

/// Builds the Google authorization URL and opens it.
fn open_federated(app: &mut AppState) -> Vec<UiEffect> {
    go_to(app, Screen::Federated);
    let form = &mut app.auth.federated;
    form.reset();

    let Some(client_id) = app.google.client_id.as_deref() else {
        form.error =
            Some("Google sign-in needs identity.google_client_id in config.toml".to_string());
        return vec![];
    };

    let request = google::build_auth_request(client_id, &app.google.redirect_uri);
    let url = request.url.clone();
    form.request = Some(request);
    vec![UiEffect::OpenBrowser { url }]
}

fn submit_federated(app: &mut AppState) -> Vec<UiEffect> {
    let form = &mut app.auth.federated;
    if let Some(busy) = auth_busy(&app.tasks) {
        form.error = Some(busy.to_string());
        return vec![];
    }
    let params = google::parse_redirect_input(form.input.value());

    if let Some(error) = &params.error {
        form.error = Some(format!("Google sign-in failed: {error}"));
        return vec![];
    }
    if let Some(request) = &form.request
        && !params.state_matches(&request.state)
    {
        form.error = Some("Redirect does not belong to this sign-in attempt".to_string());
        return vec![];
    }
    let Some(id_token) = params.id_token else {
        form.error = Some("Paste the redirect URL or the ID token".to_string());
        return vec![];
    };

    form.error = None;
    form.submitting = true;
    start_auth(app, AuthRequest::Federated { id_token })
}

/// Only one task may touch the token store at a time; an abandoned
/// sign-in still persists its session when it completes.
fn auth_busy(tasks: &Tasks) -> Option<&'static str> {
    if tasks.auth.is_running() {
        Some("Sign-in already in progress")
    } else if tasks.sign_out.is_running() {
        Some("Still signing out, try again in a moment")
    } else {
        None
    }
}

fn start_auth(app: &mut AppState, request: AuthRequest) -> Vec<UiEffect> {
    let task = app.task_seq.next_id();
    app.tasks.state_mut(TaskKind::Auth).start(task);
    vec![UiEffect::Authenticate { task, request }]
}
