//! Pure view functions. They read `&AppState`, draw to the frame, and never
//! mutate state or return effects.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::TaskKind;
use crate::features::{dashboard, links, login};
use crate::overlays::OverlayExt;
use crate::state::{AppState, Screen, Tab, TuiState};

const APP_TITLE: &str = "16Score VMix";

const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

pub fn spinner(state: &TuiState) -> &'static str {
    SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()]
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, chunks[0], state);
    render_tabs(frame, chunks[1], state);

    let body = chunks[2];
    match state.screen() {
        Screen::Loading => {
            let text = Paragraph::new(format!("{} Loading...", spinner(state)))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            let y = body.y + body.height / 2;
            frame.render_widget(text, Rect::new(body.x, y, body.width, 1));
        }
        Screen::Login => {
            login::render_login(frame, body, &state.login, state.auth.is_loading(), spinner(state));
        }
        Screen::Dashboard => {
            dashboard::render_dashboard(frame, body, state.user(), &state.api_url);
        }
        Screen::ManageLinks => {
            let fetching = state.tasks.state(TaskKind::LinksFetch).is_running()
                || state.tasks.state(TaskKind::LinkMutation).is_running();
            links::render_links(frame, body, &state.links, fetching, spinner(state));
        }
    }

    render_footer(frame, chunks[3], state);

    app.overlay.render(frame, area, state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &TuiState) {
    let mut spans = vec![Span::styled(
        format!(" {APP_TITLE} "),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if state.auth.is_authenticated()
        && let Some(user) = state.user()
    {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Welcome, {}!", user.greeting_name()),
            Style::default().fg(Color::Gray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &TuiState) {
    if !state.auth.is_authenticated() {
        return;
    }

    let mut spans = Vec::new();
    for (index, tab) in [Tab::Dashboard, Tab::ManageLinks].into_iter().enumerate() {
        let style = if tab == state.tab {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("{} {}", index + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &TuiState) {
    if let Some(notice) = &state.notice {
        frame.render_widget(
            Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Yellow))),
            area,
        );
        return;
    }

    let hints: &[(&str, &str)] = match state.screen() {
        Screen::Loading => &[("q", "quit")],
        Screen::Login => &[],
        Screen::Dashboard => &[("Tab", "switch"), ("r", "refresh"), ("L", "logout"), ("q", "quit")],
        Screen::ManageLinks => &[
            ("↑/↓", "select"),
            ("n", "new"),
            ("e", "edit"),
            ("space", "toggle"),
            ("c", "copy url"),
            ("Enter", "details"),
            ("r", "refresh"),
            ("L", "logout"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
