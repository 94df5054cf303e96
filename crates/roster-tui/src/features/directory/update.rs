//! Directory feature reducer.
//!
//! Typing goes to the search box. Arrow keys move the selection and the page;
//! every page change goes through `ViewState::set_page`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster_core::error::DirectoryError;
use roster_core::model::RawPerson;
use roster_core::pipeline::{FetchTicket, RefreshOutcome, RefreshRejected};

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::state::{AppState, Screen};

/// Shows the directory and starts the first fetch.
pub fn enter(app: &mut AppState) -> Vec<UiEffect> {
    app.screen = Screen::Directory;
    request_refresh(app)
}

/// Starts a fetch unless one is already pending.
pub fn request_refresh(app: &mut AppState) -> Vec<UiEffect> {
    match app.directory.view.begin_refresh() {
        Ok(ticket) => {
            app.directory.notice = None;
            let bearer = if app.send_token {
                app.session.cached_token().map(str::to_string)
            } else {
                None
            };
            vec![UiEffect::FetchDirectory { ticket, bearer }]
        }
        Err(RefreshRejected::InFlight) => {
            app.directory.notice = Some("Refresh already in progress".to_string());
            vec![]
        }
    }
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::F(5) => request_refresh(app),
        KeyCode::Char('r') if ctrl => request_refresh(app),
        KeyCode::Char('l') if ctrl => sign_out(app),
        KeyCode::Esc => {
            if app.directory.search.is_empty() {
                vec![UiEffect::Quit]
            } else {
                app.directory.search.clear();
                apply_search(app);
                vec![]
            }
        }
        KeyCode::Up => {
            app.directory.selected = app.directory.selected.saturating_sub(1);
            vec![]
        }
        KeyCode::Down => {
            let visible = app.directory.view.state().visible_slice().len();
            if app.directory.selected + 1 < visible {
                app.directory.selected += 1;
            }
            vec![]
        }
        KeyCode::Left | KeyCode::PageUp => {
            if app.directory.view.state_mut().prev_page().is_ok() {
                app.directory.selected = 0;
            }
            vec![]
        }
        KeyCode::Right | KeyCode::PageDown => {
            if app.directory.view.state_mut().next_page().is_ok() {
                app.directory.selected = 0;
            }
            vec![]
        }
        KeyCode::Home => {
            go_to_page(app, 1);
            vec![]
        }
        KeyCode::End => {
            let last = app.directory.view.state().page_count();
            go_to_page(app, last);
            vec![]
        }
        KeyCode::Enter => {
            if let Some(employee) = app.directory.selected_employee().cloned() {
                app.directory.detail = Some(employee);
                app.screen = Screen::Detail;
            }
            vec![]
        }
        KeyCode::Char(_) | KeyCode::Backspace | KeyCode::Delete => {
            if app.directory.search.handle_key(key) {
                apply_search(app);
            }
            vec![]
        }
        _ => vec![],
    }
}

pub fn handle_detail_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('l') if ctrl => sign_out(app),
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter => {
            app.directory.detail = None;
            app.screen = Screen::Directory;
            vec![]
        }
        _ => vec![],
    }
}

/// Pasted text is appended to the search box.
pub fn handle_paste(app: &mut AppState, text: &str) {
    app.directory.search.insert_str(text);
    apply_search(app);
}

/// Applies a fetch result. Stale tickets never touch the list or the enricher.
pub fn handle_fetched(
    app: &mut AppState,
    ticket: FetchTicket,
    result: Result<Vec<RawPerson>, DirectoryError>,
) {
    let outcome =
        app.directory
            .view
            .complete_refresh(ticket, result, &mut app.directory.enricher);
    match outcome {
        RefreshOutcome::Applied { .. } | RefreshOutcome::Failed { .. } => {
            app.directory.clamp_selection();
        }
        RefreshOutcome::Stale => {}
    }
}

/// Leaves the directory: drops the list and session, then signs out in the
/// background.
pub fn sign_out(app: &mut AppState) -> Vec<UiEffect> {
    app.directory.reset();
    app.session.forget();
    app.auth.reset();
    app.screen = Screen::Login;

    let task = app.task_seq.next_id();
    app.tasks.state_mut(TaskKind::SignOut).start(task);
    vec![UiEffect::SignOut { task }]
}

fn apply_search(app: &mut AppState) {
    let text = app.directory.search.value().to_string();
    app.directory.view.state_mut().set_filter_text(text);
    app.directory.selected = 0;
}

fn go_to_page(app: &mut AppState, page: usize) {
    let state = app.directory.view.state_mut();
    if page == state.current_page() {
        return;
    }
    if state.set_page(page).is_ok() {
        app.directory.selected = 0;
    }
}
