//! Create/edit form for one API link.
//!
//! The form stays open while its request is in flight and ignores further
//! submits until the result arrives. A failure is shown inline and the
//! fields are kept; success closes the form.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use scorelinks_core::{ApiLink, LinkDraft, LinkMutation, LinkType};

use super::OverlayUpdate;
use super::render_utils::{
    InputHint, InputLine, OverlayConfig, render_input_line, render_overlay, render_separator,
};
use crate::effects::UiEffect;
use crate::events::{FormId, MutationOrigin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFormMode {
    Create,
    Edit { link_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    MatchId,
    Type,
}

#[derive(Debug, Clone)]
pub struct LinkFormState {
    pub id: FormId,
    pub mode: LinkFormMode,
    pub match_id: String,
    pub link_type: LinkType,
    pub focus: FormField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LinkFormState {
    pub fn create(id: FormId) -> Self {
        Self {
            id,
            mode: LinkFormMode::Create,
            match_id: String::new(),
            link_type: LinkType::Full,
            focus: FormField::MatchId,
            error: None,
            submitting: false,
        }
    }

    pub fn edit(id: FormId, link: &ApiLink) -> Self {
        Self {
            mode: LinkFormMode::Edit {
                link_id: link.link_id.clone(),
            },
            match_id: link.match_id.clone(),
            link_type: link.link_type,
            ..Self::create(id)
        }
    }

    /// Re-enables the form after a failed request.
    pub fn fail(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }

    fn cycle_type(&mut self, forward: bool) {
        let all = LinkType::all();
        let current = all
            .iter()
            .position(|t| *t == self.link_type)
            .unwrap_or_default();
        let next = if forward {
            (current + 1) % all.len()
        } else {
            (current + all.len() - 1) % all.len()
        };
        self.link_type = all[next];
    }

    /// Pasted text goes into the match id, whatever field has focus.
    pub fn paste(&mut self, text: &str) {
        if self.submitting {
            return;
        }
        self.error = None;
        self.match_id.push_str(text.trim());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => return OverlayUpdate::close(),
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focus = match self.focus {
                    FormField::MatchId => FormField::Type,
                    FormField::Type => FormField::MatchId,
                };
                return OverlayUpdate::stay();
            }
            _ => {}
        }

        if self.submitting {
            return OverlayUpdate::stay();
        }
        self.error = None;

        match (self.focus, key.code) {
            (FormField::Type, KeyCode::Left | KeyCode::Char('h')) => self.cycle_type(false),
            (FormField::Type, KeyCode::Right | KeyCode::Char('l' | ' ')) => self.cycle_type(true),
            (FormField::MatchId, KeyCode::Backspace) => {
                self.match_id.pop();
            }
            (FormField::MatchId, KeyCode::Char('u')) if ctrl => self.match_id.clear(),
            (FormField::MatchId, KeyCode::Char(c)) if !ctrl => self.match_id.push(c),
            _ => {}
        }
        OverlayUpdate::stay()
    }

    fn submit(&mut self) -> OverlayUpdate {
        if self.submitting {
            return OverlayUpdate::stay();
        }

        let draft = LinkDraft::new(self.match_id.as_str(), self.link_type);
        if let Err(err) = draft.validate() {
            self.error = Some(err.message);
            return OverlayUpdate::stay();
        }

        let mutation = match &self.mode {
            LinkFormMode::Create => LinkMutation::Create(draft),
            LinkFormMode::Edit { link_id } => LinkMutation::Update {
                link_id: link_id.clone(),
                draft,
            },
        };
        self.submitting = true;
        self.error = None;

        OverlayUpdate::stay().with_ui_effects(vec![UiEffect::ApplyLinkMutation {
            task: None,
            mutation,
            origin: MutationOrigin::Form { form: self.id },
        }])
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = match self.mode {
            LinkFormMode::Create => "New API Link",
            LinkFormMode::Edit { .. } => "Edit API Link",
        };
        let hints = [
            InputHint::new("Enter", "save"),
            InputHint::new("Tab", "next field"),
            InputHint::new("←/→", "type"),
            InputHint::new("Esc", "cancel"),
        ];
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title,
                border_color: Color::Yellow,
                width: 60,
                height: 10,
                hints: &hints,
            },
        );
        let body = layout.body;
        let row = |offset: u16| Rect::new(body.x, body.y + offset, body.width, 1);

        frame.render_widget(Paragraph::new(label("Match ID", self.focus == FormField::MatchId)), row(0));
        render_input_line(
            frame,
            row(1),
            &InputLine {
                value: &self.match_id,
                placeholder: Some("e.g. 6650f1c2a9"),
                prompt: "> ",
                focused: self.focus == FormField::MatchId,
                text_color: Color::Yellow,
                cursor_color: Color::Yellow,
            },
        );
        render_separator(frame, body, 2);

        frame.render_widget(Paragraph::new(label("Type", self.focus == FormField::Type)), row(3));
        frame.render_widget(Paragraph::new(self.type_choices()), row(4));
        render_separator(frame, body, 5);

        let status = if self.submitting {
            Span::styled("Saving...", Style::default().fg(Color::Yellow))
        } else if let Some(error) = &self.error {
            Span::styled(error.as_str(), Style::default().fg(Color::Red))
        } else {
            Span::styled(
                "Fill in the match id and pick a link type",
                Style::default().fg(Color::DarkGray),
            )
        };
        frame.render_widget(Paragraph::new(Line::from(status)), row(6));
    }

    fn type_choices(&self) -> Line<'static> {
        let focused = self.focus == FormField::Type;
        let mut spans = Vec::new();
        for link_type in LinkType::all() {
            let selected = *link_type == self.link_type;
            let marker = if selected { "(•) " } else { "( ) " };
            let style = match (selected, focused) {
                (true, true) => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                (true, false) => Style::default().add_modifier(Modifier::BOLD),
                (false, _) => Style::default().fg(Color::Gray),
            };
            spans.push(Span::styled(format!("{marker}{}  ", link_type.label()), style));
        }
        Line::from(spans)
    }
}

fn label(text: &'static str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(text, style))
}
