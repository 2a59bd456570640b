//! Modal overlays. Each one owns its state, key handler and render function.
//!
//! - `link_form.rs`: create/edit form for one API link
//! - `link_details.rs`: read-only view of every field of one link
//! - `render_utils.rs`: shared rendering helpers

pub mod link_details;
pub mod link_form;
pub mod render_utils;

use crossterm::event::KeyEvent;
pub use link_details::LinkDetailsState;
pub use link_form::{LinkFormMode, LinkFormState};
use ratatui::Frame;
use ratatui::layout::Rect;
use scorelinks_core::ApiLink;

use crate::effects::UiEffect;
use crate::events::FormId;
use crate::state::TuiState;

/// Requests to open an overlay.
#[derive(Debug)]
pub enum OverlayRequest {
    CreateLink,
    EditLink(ApiLink),
    LinkDetails(ApiLink),
}

#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    Open(OverlayRequest),
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    pub fn open(request: OverlayRequest) -> Self {
        Self::new(OverlayTransition::Open(request))
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    LinkForm(LinkFormState),
    LinkDetails(LinkDetailsState),
}

impl Overlay {
    /// `form` identifies the form if the request opens one.
    pub fn from_request(request: OverlayRequest, form: FormId) -> Self {
        match request {
            OverlayRequest::CreateLink => Overlay::LinkForm(LinkFormState::create(form)),
            OverlayRequest::EditLink(link) => Overlay::LinkForm(LinkFormState::edit(form, &link)),
            OverlayRequest::LinkDetails(link) => Overlay::LinkDetails(LinkDetailsState::new(link)),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        match self {
            Overlay::LinkForm(form) => form.render(frame, area),
            Overlay::LinkDetails(details) => details.render(frame, area, tui),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::LinkForm(form) => form.handle_key(key),
            Overlay::LinkDetails(details) => details.handle_key(key),
        }
    }

    pub fn as_link_form_mut(&mut self) -> Option<&mut LinkFormState> {
        match self {
            Overlay::LinkForm(form) => Some(form),
            Overlay::LinkDetails(_) => None,
        }
    }
}

/// Convenience render helper for `Option<Overlay>`.
pub trait OverlayExt {
    fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        if let Some(overlay) = self {
            overlay.render(frame, area, tui);
        }
    }
}
