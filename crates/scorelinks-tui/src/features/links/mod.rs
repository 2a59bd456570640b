//! Manage-links screen: the API-link table and its row actions.

mod render;
mod state;

use crossterm::event::{KeyCode, KeyEvent};
pub use render::render_links;
pub use state::{COPIED_FLAG_DURATION, CopiedFlag, LinksState};
use scorelinks_core::LinkMutation;

use crate::effects::UiEffect;
use crate::events::MutationOrigin;
use crate::overlays::OverlayRequest;

/// Handles a key on the links table.
pub fn handle_key(links: &mut LinksState, key: KeyEvent) -> (Vec<UiEffect>, Option<OverlayRequest>) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            links.select_prev();
            (vec![], None)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            links.select_next();
            (vec![], None)
        }
        KeyCode::Home | KeyCode::Char('g') => {
            links.selected = 0;
            (vec![], None)
        }
        KeyCode::End | KeyCode::Char('G') => {
            links.selected = links.links.len().saturating_sub(1);
            (vec![], None)
        }
        KeyCode::Char('n') => (vec![], Some(OverlayRequest::CreateLink)),
        KeyCode::Char('e') => (
            vec![],
            links
                .selected_link()
                .cloned()
                .map(OverlayRequest::EditLink),
        ),
        KeyCode::Enter => (
            vec![],
            links
                .selected_link()
                .cloned()
                .map(OverlayRequest::LinkDetails),
        ),
        KeyCode::Char(' ' | 't') => (toggle_selected(links), None),
        KeyCode::Char('c') => (
            links
                .selected_link()
                .map(|link| UiEffect::CopyToClipboard { link: link.clone() })
                .into_iter()
                .collect(),
            None,
        ),
        KeyCode::Char('o') => (
            links
                .selected_link()
                .map(|link| UiEffect::OpenBrowser {
                    url: link.public_url.clone(),
                })
                .into_iter()
                .collect(),
            None,
        ),
        KeyCode::Char('r') => {
            links.error = None;
            (vec![UiEffect::FetchLinks { task: None }], None)
        }
        _ => (vec![], None),
    }
}

/// Starts a toggle on the selected row unless one is already in flight for it.
fn toggle_selected(links: &mut LinksState) -> Vec<UiEffect> {
    let Some(link_id) = links.selected_link().map(|link| link.link_id.clone()) else {
        return vec![];
    };
    if !links.begin_row_action(&link_id) {
        return vec![];
    }
    links.error = None;
    vec![UiEffect::ApplyLinkMutation {
        task: None,
        mutation: LinkMutation::Toggle {
            link_id: link_id.clone(),
        },
        origin: MutationOrigin::Row { link_id },
    }]
}
