//! Auth feature view: login, register and Google forms.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::state::{CredentialsForm, FederatedForm, FormField};
use crate::common::{TextInput, truncate_with_ellipsis};
use crate::render::{centered_area, key_hints, render_panel, spinner};
use crate::state::AppState;

const FORM_WIDTH: u16 = 56;
const FORM_HEIGHT: u16 = 13;

pub fn render_login(app: &AppState, frame: &mut Frame, area: Rect) {
    let mut footer = vec![key_hints(&[
        ("Enter", "sign in"),
        ("Tab", "switch field"),
        ("Esc", "quit"),
    ])];
    footer.push(key_hints(&[
        ("Ctrl+R", "create account"),
        ("Ctrl+G", "sign in with Google"),
    ]));
    render_credentials(
        app,
        frame,
        area,
        "Sign in",
        &app.auth.login,
        app.auth.notice.as_deref(),
        footer,
    );
}

pub fn render_register(app: &AppState, frame: &mut Frame, area: Rect) {
    let footer = vec![key_hints(&[
        ("Enter", "register"),
        ("Tab", "switch field"),
        ("Esc", "back to sign in"),
    ])];
    render_credentials(
        app,
        frame,
        area,
        "Create account",
        &app.auth.register,
        None,
        footer,
    );
}

fn render_credentials(
    app: &AppState,
    frame: &mut Frame,
    area: Rect,
    title: &str,
    form: &CredentialsForm,
    notice: Option<&str>,
    footer: Vec<Line<'static>>,
) {
    let popup = centered_area(area, FORM_WIDTH, FORM_HEIGHT);
    let inner = render_panel(frame, popup, title, Color::Cyan);
    let field_width = usize::from(inner.width.saturating_sub(12));

    let mut lines = vec![
        Line::from(Span::styled(
            "Use proper information to continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        field_line(
            "Email",
            &form.email,
            form.focus == FormField::Email,
            field_width,
        ),
        field_line(
            "Password",
            &form.password,
            form.focus == FormField::Password,
            field_width,
        ),
        Line::from(""),
    ];

    if form.submitting {
        lines.push(Line::from(Span::styled(
            format!("{} Contacting identity service...", spinner(app)),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Green),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.extend(footer);

    frame.render_widget(Paragraph::new(lines), inner);
}

pub fn render_federated(app: &AppState, frame: &mut Frame, area: Rect) {
    let form: &FederatedForm = &app.auth.federated;
    let popup = centered_area(area, FORM_WIDTH + 16, FORM_HEIGHT + 3);
    let inner = render_panel(frame, popup, "Sign in with Google", Color::Cyan);
    let width = usize::from(inner.width);

    let mut lines = Vec::new();
    if let Some(request) = &form.request {
        lines.push(Line::from("Opened this URL in your browser:"));
        lines.push(Line::from(Span::styled(
            truncate_with_ellipsis(&request.url, width),
            Style::default().fg(Color::Blue),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(
            "After signing in, paste the URL you were redirected to:",
        ));
    } else {
        lines.push(Line::from("Paste a Google ID token:"));
    }
    lines.push(field_line(
        ">",
        &form.input,
        true,
        width.saturating_sub(4),
    ));
    lines.push(Line::from(""));

    if form.submitting {
        lines.push(Line::from(Span::styled(
            format!("{} Exchanging credential...", spinner(app)),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::from(""));
    lines.push(key_hints(&[
        ("Enter", "continue"),
        ("Ctrl+O", "reopen browser"),
        ("Esc", "back"),
    ]));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn field_line(label: &str, input: &TextInput, focused: bool, width: usize) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut value = truncate_with_ellipsis(&input.display(), width);
    if focused {
        value.push('▏');
    }
    Line::from(vec![
        Span::styled(format!("{label:>9} "), label_style),
        Span::raw(value),
    ])
}
