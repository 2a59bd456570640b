//! Read-only view of one API link, including the public URL.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use scorelinks_core::ApiLink;

use super::render_utils::{InputHint, OverlayConfig, render_overlay};
use super::{OverlayRequest, OverlayUpdate};
use crate::effects::UiEffect;
use crate::features::dashboard::{format_date, format_datetime};
use crate::state::TuiState;

#[derive(Debug, Clone)]
pub struct LinkDetailsState {
    /// Snapshot taken when the overlay opened; a newer list entry wins.
    pub link: ApiLink,
}

impl LinkDetailsState {
    pub fn new(link: ApiLink) -> Self {
        Self { link }
    }

    fn current<'a>(&'a self, tui: &'a TuiState) -> &'a ApiLink {
        tui.links
            .links
            .iter()
            .find(|link| link.link_id == self.link.link_id)
            .unwrap_or(&self.link)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Char('c') => OverlayUpdate::stay().with_ui_effects(vec![
                UiEffect::CopyToClipboard {
                    link: self.link.clone(),
                },
            ]),
            KeyCode::Char('o') => OverlayUpdate::stay().with_ui_effects(vec![UiEffect::OpenBrowser {
                url: self.link.public_url.clone(),
            }]),
            KeyCode::Char('e') => OverlayUpdate::open(OverlayRequest::EditLink(self.link.clone())),
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        let link = self.current(tui);
        let hints = [
            InputHint::new("c", "copy url"),
            InputHint::new("o", "open"),
            InputHint::new("e", "edit"),
            InputHint::new("Esc", "close"),
        ];
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title: "API Link",
                border_color: Color::Cyan,
                width: 76,
                height: 14,
                hints: &hints,
            },
        );

        let status = if link.is_active { "Active" } else { "Inactive" };
        let last_accessed = link
            .last_accessed
            .as_ref()
            .map_or_else(|| "Never".to_string(), format_datetime);
        let url = if tui.links.is_copied(&link.link_id) {
            format!("{}  Copied!", link.public_url)
        } else {
            link.public_url.clone()
        };

        let lines: Vec<Line> = [
            ("Link ID", link.link_id.clone()),
            ("Match ID", link.match_id.clone()),
            ("Type", link.link_type.label().to_string()),
            ("Status", status.to_string()),
            ("Public URL", url),
            ("Accesses", link.access_count.to_string()),
            ("Last access", last_accessed),
            ("Created", format_date(&link.created_at)),
            ("Updated", format_datetime(&link.updated_at)),
        ]
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        })
        .collect();

        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }),
            layout.body,
        );
    }
}
