//! Dashboard: account summary for the signed-in user.

use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use scorelinks_core::User;

const LABEL_WIDTH: usize = 14;

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%b %-d, %Y").to_string()
}

pub fn format_datetime(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%b %-d, %Y %H:%M")
        .to_string()
}

pub fn render_dashboard(frame: &mut Frame, area: Rect, user: Option<&User>, api_url: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Account ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(user) = user else {
        let text = Paragraph::new("No user information available. Press r to refresh.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(text, inner);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Welcome back, {}!", user.greeting_name()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    lines.extend(
        [
            ("Name", user.display_name()),
            ("Email", user.email.clone()),
            ("Member since", format_date(&user.created_at)),
            ("User ID", user.id.clone()),
            ("Last updated", format_datetime(&user.updated_at)),
            ("API server", api_url.to_string()),
        ]
        .into_iter()
        .map(|(label, value)| field(label, value)),
    );

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label:<LABEL_WIDTH$}"),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(value),
    ])
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_date_includes_year() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(format_date(&ts).ends_with("2024"));
    }
}
