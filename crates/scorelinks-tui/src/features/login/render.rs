use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{LoginField, LoginFormState};
use crate::common::{mask, truncate_start_with_ellipsis};
use crate::overlays::render_utils::{InputHint, calculate_overlay_area, render_hints};

const FORM_WIDTH: u16 = 56;
const FORM_HEIGHT: u16 = 14;

pub fn render_login(
    frame: &mut Frame,
    area: Rect,
    form: &LoginFormState,
    loading: bool,
    spinner: &str,
) {
    let popup = calculate_overlay_area(area, area.height, FORM_WIDTH, FORM_HEIGHT);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Welcome Back ")
        .title_alignment(Alignment::Center)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let field_width = inner.width.saturating_sub(4) as usize;
    let mut lines = vec![
        Line::from(Span::styled(
            "Sign in to manage your API links",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        Line::default(),
    ];
    lines.extend(field_lines(
        "Email",
        &truncate_start_with_ellipsis(&form.email, field_width),
        "you@example.com",
        form.focus == LoginField::Email,
    ));
    lines.extend(field_lines(
        "Password",
        &truncate_start_with_ellipsis(&mask(&form.password), field_width),
        "",
        form.focus == LoginField::Password,
    ));

    if loading {
        lines.push(Line::from(Span::styled(
            format!("{spinner} Signing in..."),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);

    let hints = [
        InputHint::new("Enter", "sign in"),
        InputHint::new("Tab", "next field"),
        InputHint::new("Esc", "quit"),
    ];
    render_hints(frame, inner, &hints, Color::Cyan);
}

fn field_lines<'a>(label: &'a str, value: &str, placeholder: &'a str, focused: bool) -> [Line<'a>; 3] {
    let marker_color = if focused { Color::Cyan } else { Color::DarkGray };
    let label_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut input = vec![Span::styled("> ", Style::default().fg(marker_color))];
    if value.is_empty() && !placeholder.is_empty() {
        if focused {
            input.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
        input.push(Span::styled(placeholder, Style::default().fg(Color::DarkGray)));
    } else {
        input.push(Span::raw(value.to_string()));
        if focused {
            input.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
    }

    [
        Line::from(Span::styled(label, label_style)),
        Line::from(input),
        Line::default(),
    ]
}
