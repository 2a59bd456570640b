use scorelinks_core::clipboard::ClipboardSink;
use scorelinks_core::{ApiLink, LinkDirectory, LinkMutation};

use crate::events::{LinksUiEvent, MutationOrigin, UiEvent};

pub async fn fetch_links(directory: LinkDirectory) -> UiEvent {
    UiEvent::Links(LinksUiEvent::Loaded(directory.list_tagged().await))
}

/// Runs the mutation, then re-fetches. The refetch is only issued once the
/// mutation response has arrived.
pub async fn apply_mutation(
    directory: LinkDirectory,
    mutation: LinkMutation,
    origin: MutationOrigin,
) -> UiEvent {
    if let Err(error) = directory.mutate(&mutation).await {
        tracing::warn!(action = %mutation.describe(), "api link mutation failed: {}", error.message);
        return UiEvent::Links(LinksUiEvent::MutationFailed { origin, error });
    }
    let refetch = directory.list_tagged().await;
    UiEvent::Links(LinksUiEvent::Mutated { origin, refetch })
}

pub fn copy_link(link: &ApiLink, clipboard: &dyn ClipboardSink) -> UiEvent {
    let result = LinkDirectory::copy_public_url(link, clipboard).map_err(|err| err.to_string());
    UiEvent::Copied {
        link_id: link.link_id.clone(),
        result,
    }
}
