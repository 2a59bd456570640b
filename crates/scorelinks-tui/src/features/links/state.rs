use std::time::{Duration, Instant};

use scorelinks_core::ApiLink;
use scorelinks_core::links::{ListSnapshot, SnapshotGate};

/// How long the "Copied!" flag stays on a row.
pub const COPIED_FLAG_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct CopiedFlag {
    pub link_id: String,
    pub at: Instant,
}

#[derive(Debug, Default)]
pub struct LinksState {
    /// Last accepted server snapshot, in server order.
    pub links: Vec<ApiLink>,
    pub selected: usize,
    /// False until the first snapshot arrives.
    pub loaded: bool,
    pub error: Option<String>,
    pub gate: SnapshotGate,
    pub copied: Option<CopiedFlag>,
    /// Link ids with a row action in flight.
    pub pending: Vec<String>,
}

impl LinksState {
    pub fn selected_link(&self) -> Option<&ApiLink> {
        self.links.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.links.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Replaces the list if `snapshot` is the newest seen so far.
    ///
    /// The selection follows the previously selected link when it is still
    /// present. Returns false for a stale snapshot, which is dropped.
    pub fn apply_snapshot(&mut self, snapshot: ListSnapshot) -> bool {
        if !self.gate.accept(snapshot.tag) {
            tracing::debug!(tag = snapshot.tag.0, "dropping stale api link snapshot");
            return false;
        }

        let selected_id = self.selected_link().map(|link| link.link_id.clone());
        self.links = snapshot.links;
        self.loaded = true;
        self.error = None;
        self.selected = selected_id
            .and_then(|id| self.links.iter().position(|link| link.link_id == id))
            .unwrap_or(self.selected)
            .min(self.links.len().saturating_sub(1));
        true
    }

    /// Marks a row busy. Returns false if it already was.
    pub fn begin_row_action(&mut self, link_id: &str) -> bool {
        if self.is_pending(link_id) {
            return false;
        }
        self.pending.push(link_id.to_string());
        true
    }

    pub fn end_row_action(&mut self, link_id: &str) {
        self.pending.retain(|id| id != link_id);
    }

    pub fn is_pending(&self, link_id: &str) -> bool {
        self.pending.iter().any(|id| id == link_id)
    }

    pub fn mark_copied(&mut self, link_id: String, now: Instant) {
        self.copied = Some(CopiedFlag { link_id, at: now });
    }

    pub fn is_copied(&self, link_id: &str) -> bool {
        self.copied
            .as_ref()
            .is_some_and(|flag| flag.link_id == link_id)
    }

    pub fn expire_copied(&mut self, now: Instant) {
        if self
            .copied
            .as_ref()
            .is_some_and(|flag| now.duration_since(flag.at) >= COPIED_FLAG_DURATION)
        {
            self.copied = None;
        }
    }

    pub fn count_line(&self) -> String {
        format!("{} API link(s) found", self.links.len())
    }
}
