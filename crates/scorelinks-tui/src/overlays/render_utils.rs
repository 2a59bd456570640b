use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::common::truncate_start_with_ellipsis;

/// Centers a `width` x `height` box inside `area`, clamped to fit.
pub fn calculate_overlay_area(area: Rect, available_height: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(available_height.saturating_sub(2));

    let overlay_x = area.x + (area.width.saturating_sub(width)) / 2;
    let overlay_y = area.y + (available_height.saturating_sub(height)) / 2;
    Rect::new(overlay_x, overlay_y, width, height)
}

/// Clears the background and draws the border and title.
pub fn render_overlay_container(frame: &mut Frame, area: Rect, title: &str, border_color: Color) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);
}

pub struct OverlayConfig<'a> {
    pub title: &'a str,
    pub border_color: Color,
    pub width: u16,
    pub height: u16,
    pub hints: &'a [InputHint<'a>],
}

pub struct OverlayLayout {
    pub body: Rect,
}

/// Renders a standard overlay container and returns its layout.
pub fn render_overlay(frame: &mut Frame, area: Rect, config: &OverlayConfig<'_>) -> OverlayLayout {
    let popup = calculate_overlay_area(area, area.height, config.width, config.height);
    render_overlay_container(frame, popup, config.title, config.border_color);

    let inner = Rect::new(
        popup.x + 1,
        popup.y + 1,
        popup.width.saturating_sub(2),
        popup.height.saturating_sub(2),
    );

    if !config.hints.is_empty() {
        render_hints(frame, inner, config.hints, config.border_color);
    }

    let footer_height = u16::from(!config.hints.is_empty());
    let body = Rect::new(
        inner.x,
        inner.y,
        inner.width,
        inner.height.saturating_sub(footer_height),
    );

    OverlayLayout { body }
}

pub struct InputHint<'a> {
    pub key: &'a str,
    pub action: &'a str,
}

impl<'a> InputHint<'a> {
    pub fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

pub struct InputLine<'a> {
    pub value: &'a str,
    pub placeholder: Option<&'a str>,
    pub prompt: &'a str,
    pub focused: bool,
    pub text_color: Color,
    pub cursor_color: Color,
}

/// Renders a prompt-style input line: "> <text>█". The cursor only shows when focused.
pub fn render_input_line(frame: &mut Frame, area: Rect, input: &InputLine<'_>) {
    let is_placeholder = input.value.is_empty() && input.placeholder.is_some();
    let max_text_width = area.width.saturating_sub(input.prompt.len() as u16 + 1) as usize;
    let prompt_color = if input.focused {
        input.cursor_color
    } else {
        Color::DarkGray
    };

    let mut spans = vec![Span::styled(input.prompt, Style::default().fg(prompt_color))];
    let cursor = input
        .focused
        .then(|| Span::styled("█", Style::default().fg(input.cursor_color)));

    if is_placeholder {
        spans.extend(cursor);
        spans.push(Span::styled(
            truncate_start_with_ellipsis(input.placeholder.unwrap_or(""), max_text_width),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(
            truncate_start_with_ellipsis(input.value, max_text_width),
            Style::default().fg(input.text_color),
        ));
        spans.extend(cursor);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders a line of keyboard hints on the last row of `area`.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint], highlight_color: Color) {
    let hints_y = area.y + area.height.saturating_sub(1);
    let hints_area = Rect::new(area.x, hints_y, area.width, 1);

    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(highlight_color)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let para = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(para, hints_area);
}

pub fn render_separator(frame: &mut Frame, area: Rect, y_offset: u16) {
    if y_offset >= area.height {
        return;
    }
    let separator = "─".repeat(area.width as usize);
    let separator_area = Rect::new(area.x, area.y + y_offset, area.width, 1);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        separator_area,
    );
}
