// Tab activation and close logic - pure functions over the tab list.
// No store, no I/O, unit tested in isolation.

use crate::state::Tab;

/// Result of removing a tab from the list.
#[derive(Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// No tab with that id; the list is untouched.
    NotFound,
    /// The last tab was closed; the caller must synthesize a replacement.
    Emptied,
    /// Tab removed. `new_active_id` is set when the closed tab was the
    /// active one and the most recently created survivor took over.
    Closed { new_active_id: Option<String> },
}

/// Mark the tab with `id` active and all others inactive.
/// Returns false (list untouched) when `id` is unknown.
pub fn activate(tabs: &mut [Tab], id: &str) -> bool {
    if !tabs.iter().any(|t| t.id == id) {
        return false;
    }
    for tab in tabs.iter_mut() {
        tab.is_active = tab.id == id;
    }
    true
}

/// Remove the tab with `id`. When the active tab is closed and others
/// remain, the most recently created survivor (last in creation order)
/// becomes active.
pub fn close(tabs: &mut Vec<Tab>, id: &str) -> CloseOutcome {
    let Some(index) = tabs.iter().position(|t| t.id == id) else {
        return CloseOutcome::NotFound;
    };

    let closed = tabs.remove(index);
    if tabs.is_empty() {
        return CloseOutcome::Emptied;
    }

    let mut new_active_id = None;
    if closed.is_active {
        if let Some(successor) = tabs.last_mut() {
            successor.is_active = true;
            new_active_id = Some(successor.id.clone());
        }
    }

    CloseOutcome::Closed { new_active_id }
}

pub fn find<'a>(tabs: &'a [Tab], id: &str) -> Option<&'a Tab> {
    tabs.iter().find(|t| t.id == id)
}

pub fn find_mut<'a>(tabs: &'a mut [Tab], id: &str) -> Option<&'a mut Tab> {
    tabs.iter_mut().find(|t| t.id == id)
}

pub fn active_tab(tabs: &[Tab]) -> Option<&Tab> {
    tabs.iter().find(|t| t.is_active)
}

/// Most recently created tab in the given privacy partition.
pub fn most_recent_in_partition<'a>(tabs: &'a [Tab], is_private: bool) -> Option<&'a Tab> {
    tabs.iter().rev().find(|t| t.is_private == is_private)
}
