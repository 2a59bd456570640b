use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use scorelinks_core::ApiLink;

use super::LinksState;
use crate::common::truncate_with_ellipsis;
use crate::features::dashboard::format_date;

const LINK_ID_WIDTH: u16 = 14;

pub fn render_links(frame: &mut Frame, area: Rect, links: &LinksState, fetching: bool, spinner: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    frame.render_widget(Paragraph::new(summary_line(links, fetching, spinner)), chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" API Links ");

    if links.links.is_empty() {
        let message = if !links.loaded && fetching {
            "Loading API links..."
        } else if !links.loaded {
            "API links not loaded. Press r to refresh."
        } else {
            "No API links yet. Press n to create one."
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            chunks[1],
        );
        return;
    }

    let header = Row::new(
        ["Match ID", "Type", "Created", "Accesses", "Link ID", "Status"]
            .map(|title| Cell::from(title).style(Style::default().add_modifier(Modifier::BOLD))),
    )
    .style(Style::default().fg(Color::Gray));

    let rows = links.links.iter().map(|link| link_row(links, link));
    let widths = [
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(LINK_ID_WIDTH),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("› ");

    let mut table_state = TableState::default().with_selected(Some(links.selected));
    frame.render_stateful_widget(table, chunks[1], &mut table_state);
}

fn summary_line<'a>(links: &LinksState, fetching: bool, spinner: &str) -> Line<'a> {
    let mut spans = vec![Span::styled(
        links.count_line(),
        Style::default().fg(Color::Gray),
    )];
    if fetching {
        spans.push(Span::styled(
            format!("  {spinner} refreshing"),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(error) = &links.error {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

fn link_row<'a>(links: &LinksState, link: &'a ApiLink) -> Row<'a> {
    let link_id = if links.is_copied(&link.link_id) {
        Cell::from("Copied!").style(Style::default().fg(Color::Green))
    } else {
        Cell::from(truncate_with_ellipsis(&link.link_id, LINK_ID_WIDTH as usize))
    };

    let status = if links.is_pending(&link.link_id) {
        Cell::from("…").style(Style::default().fg(Color::Yellow))
    } else if link.is_active {
        Cell::from("Active").style(Style::default().fg(Color::Green))
    } else {
        Cell::from("Inactive").style(Style::default().fg(Color::Red))
    };

    Row::new(vec![
        Cell::from(link.match_id.as_str()),
        Cell::from(link.link_type.label()),
        Cell::from(format_date(&link.created_at)),
        Cell::from(link.access_count.to_string()),
        link_id,
        status,
    ])
}
