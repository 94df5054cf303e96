//! Directory feature view: search bar, employee cards, pager and detail.

use std::iter;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use roster_core::model::{DisplayEmployee, EmploymentStatus, format_rupiah};

use crate::common::truncate_with_ellipsis;
use crate::render::{centered_area, key_hints, render_panel, spinner};
use crate::state::AppState;

/// Rows per card, borders excluded.
const CARD_BODY_HEIGHT: u16 = 2;
const CARD_HEIGHT: u16 = CARD_BODY_HEIGHT + 2;

pub fn render_directory(app: &AppState, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_search(app, frame, chunks[0]);
    render_cards(app, frame, chunks[1]);
    render_pager(app, frame, chunks[2]);
    frame.render_widget(
        Paragraph::new(key_hints(&[
            ("type", "search"),
            ("↑↓", "select"),
            ("←→", "page"),
            ("Enter", "details"),
            ("F5", "refresh"),
            ("Ctrl+L", "sign out"),
        ])),
        chunks[3],
    );
}

fn render_search(app: &AppState, frame: &mut Frame, area: Rect) {
    let search = &app.directory.search;
    let width = usize::from(area.width.saturating_sub(4));
    let line = if search.is_empty() {
        Line::from(Span::styled(
            "Search by name",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut value = truncate_with_ellipsis(search.value(), width);
        value.push('▏');
        Line::from(value)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Search ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_cards(app: &AppState, frame: &mut Frame, area: Rect) {
    let view = &app.directory.view;

    if view.is_initial_load() {
        let message = format!("{} Loading employees...", spinner(app));
        render_message(frame, area, &message, Color::Yellow);
        return;
    }

    let visible = view.state().visible_slice();
    if visible.is_empty() {
        let (message, color) = match view.last_error() {
            Some(error) => (format!("Could not load employees: {error}"), Color::Red),
            None if view.is_loaded() => ("No employees match".to_string(), Color::DarkGray),
            None => ("No employees loaded".to_string(), Color::DarkGray),
        };
        render_message(frame, area, &message, color);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            visible
                .iter()
                .map(|_| Constraint::Length(CARD_HEIGHT))
                .chain(iter::once(Constraint::Min(0))),
        )
        .split(area);

    for (idx, employee) in visible.iter().enumerate() {
        render_card(
            frame,
            rows[idx],
            employee,
            idx == app.directory.selected,
        );
    }
}

fn render_card(frame: &mut Frame, area: Rect, employee: &DisplayEmployee, selected: bool) {
    let border_color = if selected { Color::Cyan } else { Color::DarkGray };
    let width = usize::from(area.width.saturating_sub(4));
    let title_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {} ", truncate_with_ellipsis(&employee.name, width)),
            title_style,
        ))
        .title(status_badge(employee.status).right_aligned());

    let lines = vec![
        Line::from(vec![
            Span::styled(employee.position.clone(), Style::default().fg(Color::Gray)),
            Span::raw("  ·  "),
            Span::raw(format!("{} yrs", employee.experience)),
            Span::raw("  ·  "),
            Span::styled(
                format!("★ {}", employee.rating),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(Span::styled(
            format!("{}/month", format_rupiah(employee.salary)),
            Style::default().fg(Color::Green),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn status_badge(status: EmploymentStatus) -> Line<'static> {
    let color = match status {
        EmploymentStatus::Permanent => Color::Green,
        EmploymentStatus::Contract => Color::Magenta,
    };
    Line::from(Span::styled(
        format!(" {status} "),
        Style::default().fg(color),
    ))
}

fn render_pager(app: &AppState, frame: &mut Frame, area: Rect) {
    let view = &app.directory.view;
    let state = view.state();
    let page_count = state.page_count();

    let mut spans = Vec::new();
    if page_count == 0 {
        spans.push(Span::styled(
            "No employees match",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(format!(
            "Page {} of {}",
            state.current_page(),
            page_count
        )));
        spans.push(Span::styled(
            format!("  ({} employees)", state.filtered_len()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if view.is_refreshing() && view.is_loaded() {
        spans.push(Span::styled(
            format!("  {} refreshing", spinner(app)),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(error) = view.last_error().filter(|_| view.is_loaded()) {
        spans.push(Span::styled(
            format!("  refresh failed: {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    if let Some(notice) = &app.directory.notice {
        spans.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(color),
        )))
        .wrap(Wrap { trim: true }),
        area,
    );
}

/// Full record for the employee opened from the list.
pub fn render_detail(app: &AppState, frame: &mut Frame, area: Rect) {
    let Some(employee) = &app.directory.detail else {
        return;
    };

    let popup = centered_area(area, 72, 14);
    let inner = render_panel(frame, popup, &employee.name, Color::Cyan);
    let label = Style::default().fg(Color::Gray);
    let row = |name: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{name:>12}  "), label),
            Span::raw(value),
        ])
    };

    let lines = vec![
        row("ID", employee.id.to_string()),
        row("Position", employee.position.clone()),
        row("Status", employee.status.to_string()),
        row("Experience", format!("{} years", employee.experience)),
        row("Rating", employee.rating.clone()),
        row(
            "Salary",
            format!("{}/month", format_rupiah(employee.salary)),
        ),
        row("Address", employee.address.one_line()),
        row("Avatar", employee.avatar.clone()),
        Line::from(""),
        key_hints(&[("Esc", "back"), ("Ctrl+L", "sign out")]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
