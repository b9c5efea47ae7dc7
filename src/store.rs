// The browser store: owns tabs, per-tab navigation history, bookmarks, the
// visit log, quick links, and the mode/theme flags. Constructed once at app
// start with injected persistence and title-resolution collaborators.
//
// All mutations take the state lock once and are atomic from the caller's
// perspective. The only asynchronous work is title resolution, spawned
// fire-and-forget from `navigate_tab` and guarded by the per-tab navigation
// sequence so stale completions never clobber newer state.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::StoreError;
use crate::modules::tabs::{self, CloseOutcome};
use crate::resolver::TitleResolver;
use crate::state::{
    generate_id, Bookmark, HistoryEntry, QuickLink, Tab, Theme, LOADING_TITLE, NEW_TAB_URL,
};
use crate::storage::{Snapshot, StorageBackend};

/// Visit log keeps at most this many entries; the oldest are discarded.
pub const HISTORY_LIMIT: usize = 100;

/// System-wide cap on quick links; creation past it is rejected.
pub const QUICK_LINK_LIMIT: usize = 20;

/// Partial-field update for a quick link. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct QuickLinkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

struct BrowserState {
    tabs: Vec<Tab>,
    active_tab_id: String,
    bookmarks: Vec<Bookmark>,
    history: Vec<HistoryEntry>,
    quick_links: Vec<QuickLink>,
    theme: Theme,
    has_completed_onboarding: bool,
}

fn snapshot_of(state: &BrowserState) -> Snapshot {
    Snapshot {
        bookmarks: state.bookmarks.clone(),
        history: state.history.clone(),
        quick_links: state.quick_links.clone(),
        theme: state.theme,
        has_completed_onboarding: state.has_completed_onboarding,
    }
}

/// Private mode is derived from the active tab, never stored, so it cannot
/// diverge from the tab it mirrors.
fn private_mode_of(state: &BrowserState) -> bool {
    tabs::find(&state.tabs, &state.active_tab_id)
        .map(|t| t.is_private)
        .unwrap_or(false)
}

fn push_new_tab(state: &mut BrowserState, url: &str, is_private: bool) -> String {
    for tab in state.tabs.iter_mut() {
        tab.is_active = false;
    }
    let tab = Tab::new(url, is_private);
    let id = tab.id.clone();
    state.active_tab_id = id.clone();
    state.tabs.push(tab);
    id
}

fn push_history_entry(state: &mut BrowserState, title: &str, url: &str) {
    state.history.insert(
        0,
        HistoryEntry {
            id: generate_id(),
            title: title.to_string(),
            url: url.to_string(),
            visited_at: Utc::now(),
        },
    );
    state.history.truncate(HISTORY_LIMIT);
}

/// Apply a completed title resolution. Returns false (and changes nothing)
/// when the tab is gone or has navigated again since the resolution was
/// issued.
fn apply_resolution(
    state: &mut BrowserState,
    tab_id: &str,
    seq: u64,
    url: &str,
    title: &str,
    was_private: bool,
) -> bool {
    let Some(tab) = tabs::find_mut(&mut state.tabs, tab_id) else {
        log::debug!("[Nav] Dropping resolution for closed tab {}", tab_id);
        return false;
    };
    if tab.nav_seq != seq {
        log::debug!("[Nav] Dropping stale resolution for tab {}", tab_id);
        return false;
    }

    tab.is_loading = false;
    tab.title = title.to_string();
    tab.navigation_history.retitle_current(title);

    if !was_private && url != NEW_TAB_URL {
        push_history_entry(state, title, url);
    }
    true
}

pub struct BrowserStore {
    state: Arc<Mutex<BrowserState>>,
    storage: Arc<dyn StorageBackend>,
    resolver: Arc<dyn TitleResolver>,
}

impl BrowserStore {
    /// Build the store from a loaded snapshot (or first-launch defaults) and
    /// exactly one fresh default tab. Tabs are never restored across
    /// sessions.
    pub fn new(storage: Arc<dyn StorageBackend>, resolver: Arc<dyn TitleResolver>) -> Self {
        let snapshot = match storage.load() {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                log::warn!("[Storage] Load failed: {}, starting from defaults", e);
                Snapshot::default()
            }
        };

        let tab = Tab::new(NEW_TAB_URL, false);
        let active_tab_id = tab.id.clone();
        log::info!("[Tabs] Bootstrapped with default tab {}", active_tab_id);

        Self {
            state: Arc::new(Mutex::new(BrowserState {
                tabs: vec![tab],
                active_tab_id,
                bookmarks: snapshot.bookmarks,
                history: snapshot.history,
                quick_links: snapshot.quick_links,
                theme: snapshot.theme,
                has_completed_onboarding: snapshot.has_completed_onboarding,
            })),
            storage,
            resolver,
        }
    }

    /// Production wiring: JSON-file persistence under `data_dir` and the
    /// fixed-delay title resolver.
    pub fn open(data_dir: std::path::PathBuf) -> Self {
        Self::new(
            Arc::new(crate::storage::JsonFileStorage::new(data_dir)),
            Arc::new(crate::resolver::FixedDelayResolver),
        )
    }

    fn persist(&self, snapshot: Snapshot) {
        // Write outside the state lock; the in-memory state stays
        // authoritative if the backend fails.
        if let Err(e) = self.storage.save(&snapshot) {
            log::warn!("[Storage] Save failed: {}", e);
        }
    }

    // --- Tab lifecycle ---

    /// Open a tab at `url` (the new-tab page by default), activate it, and
    /// deactivate all others. Returns the new tab's id.
    pub fn create_tab(&self, url: &str, is_private: bool) -> String {
        let (id, snapshot) = {
            let mut state = self.state.lock().unwrap();
            let id = push_new_tab(&mut state, url, is_private);
            log::info!(
                "[Tabs] Created {} tab {} at {}",
                if is_private { "private" } else { "normal" },
                id,
                url
            );
            (id, snapshot_of(&state))
        };
        self.persist(snapshot);
        id
    }

    /// Close a tab. Closing the last tab synthesizes a fresh default
    /// non-private tab; closing the active tab promotes the most recently
    /// created survivor. Unknown ids are a no-op.
    pub fn close_tab(&self, id: &str) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            match tabs::close(&mut state.tabs, id) {
                CloseOutcome::NotFound => {
                    log::debug!("[Tabs] Close ignored for unknown tab {}", id);
                    return;
                }
                CloseOutcome::Emptied => {
                    let fresh = push_new_tab(&mut state, NEW_TAB_URL, false);
                    log::info!("[Tabs] Closed last tab {}, opened fresh tab {}", id, fresh);
                }
                CloseOutcome::Closed { new_active_id } => {
                    if let Some(next) = new_active_id {
                        state.active_tab_id = next.clone();
                        log::info!("[Tabs] Closed active tab {}, switched to {}", id, next);
                    } else {
                        log::info!("[Tabs] Closed tab {}", id);
                    }
                }
            }
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    /// Switch to the tab with `id`. Unknown ids are a no-op.
    pub fn set_active_tab(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if tabs::activate(&mut state.tabs, id) {
            state.active_tab_id = id.to_string();
        } else {
            log::debug!("[Tabs] Activation ignored for unknown tab {}", id);
        }
    }

    /// Switch to the other privacy partition: activates the most recently
    /// created tab there, or opens a fresh one when the partition is empty.
    pub fn toggle_private_mode(&self) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let target = !private_mode_of(&state);
            let existing = tabs::most_recent_in_partition(&state.tabs, target).map(|t| t.id.clone());
            match existing {
                Some(id) => {
                    tabs::activate(&mut state.tabs, &id);
                    state.active_tab_id = id.clone();
                    log::info!("[Tabs] Switched to existing tab {} (private={})", id, target);
                }
                None => {
                    let id = push_new_tab(&mut state, NEW_TAB_URL, target);
                    log::info!("[Tabs] Opened tab {} for empty partition (private={})", id, target);
                }
            }
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    // --- Navigation ---

    /// Navigate a tab. The synchronous phase records the loading state and
    /// the new history entry; the title then resolves in the background and
    /// applies only if the tab has not navigated again (or closed) meanwhile.
    ///
    /// Must be called from within a tokio runtime.
    pub fn navigate_tab(&self, id: &str, url: &str) {
        let issued = {
            let mut state = self.state.lock().unwrap();
            match tabs::find_mut(&mut state.tabs, id) {
                Some(tab) => {
                    tab.nav_seq += 1;
                    tab.navigation_history.push(url, LOADING_TITLE);
                    tab.url = url.to_string();
                    tab.title = LOADING_TITLE.to_string();
                    tab.is_loading = true;
                    Some((tab.nav_seq, tab.is_private))
                }
                None => {
                    log::debug!("[Nav] Navigation ignored for unknown tab {}", id);
                    None
                }
            }
        };
        let Some((seq, was_private)) = issued else {
            return;
        };
        log::info!("[Nav] Tab {} -> {} (seq {})", id, url, seq);

        let state = Arc::clone(&self.state);
        let storage = Arc::clone(&self.storage);
        let resolver = Arc::clone(&self.resolver);
        let id = id.to_string();
        let url = url.to_string();
        tokio::spawn(async move {
            let title = resolver.resolve(&url).await;
            let snapshot = {
                let mut state = state.lock().unwrap();
                if !apply_resolution(&mut state, &id, seq, &url, &title, was_private) {
                    return;
                }
                log::info!("[Nav] Tab {} resolved to \"{}\"", id, title);
                snapshot_of(&state)
            };
            if let Err(e) = storage.save(&snapshot) {
                log::warn!("[Storage] Save failed: {}", e);
            }
        });
    }

    /// Step back in a tab's history. No-op at the boundary or for unknown
    /// ids. Invalidates any in-flight resolution for the tab.
    pub fn go_back(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        let Some(tab) = tabs::find_mut(&mut state.tabs, id) else {
            return;
        };
        let Some(entry) = tab.navigation_history.go_back().cloned() else {
            return;
        };
        tab.nav_seq += 1;
        tab.url = entry.url;
        tab.title = entry.title;
        tab.is_loading = false;
    }

    /// Step forward in a tab's history. Mirror of `go_back`.
    pub fn go_forward(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        let Some(tab) = tabs::find_mut(&mut state.tabs, id) else {
            return;
        };
        let Some(entry) = tab.navigation_history.go_forward().cloned() else {
            return;
        };
        tab.nav_seq += 1;
        tab.url = entry.url;
        tab.title = entry.title;
        tab.is_loading = false;
    }

    pub fn can_go_back(&self, id: &str) -> bool {
        let state = self.state.lock().unwrap();
        tabs::find(&state.tabs, id)
            .map(|t| t.navigation_history.can_go_back())
            .unwrap_or(false)
    }

    pub fn can_go_forward(&self, id: &str) -> bool {
        let state = self.state.lock().unwrap();
        tabs::find(&state.tabs, id)
            .map(|t| t.navigation_history.can_go_forward())
            .unwrap_or(false)
    }

    // --- Bookmarks ---

    pub fn add_bookmark(&self, title: &str, url: &str) -> String {
        let (id, snapshot) = {
            let mut state = self.state.lock().unwrap();
            let bookmark = Bookmark {
                id: generate_id(),
                title: title.to_string(),
                url: url.to_string(),
                created_at: Utc::now(),
            };
            let id = bookmark.id.clone();
            state.bookmarks.push(bookmark);
            (id, snapshot_of(&state))
        };
        self.persist(snapshot);
        id
    }

    pub fn remove_bookmark(&self, id: &str) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let before = state.bookmarks.len();
            state.bookmarks.retain(|b| b.id != id);
            if state.bookmarks.len() == before {
                log::debug!("[Bookmarks] Remove ignored for unknown bookmark {}", id);
                return;
            }
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    /// Star-button behavior: unbookmark the URL if any bookmark matches
    /// (removing every match), otherwise bookmark it. The new-tab page is
    /// never bookmarkable.
    pub fn toggle_bookmark(&self, title: &str, url: &str) {
        if url == NEW_TAB_URL {
            return;
        }
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if state.bookmarks.iter().any(|b| b.url == url) {
                state.bookmarks.retain(|b| b.url != url);
                log::info!("[Bookmarks] Removed bookmarks for {}", url);
            } else {
                state.bookmarks.push(Bookmark {
                    id: generate_id(),
                    title: title.to_string(),
                    url: url.to_string(),
                    created_at: Utc::now(),
                });
                log::info!("[Bookmarks] Added bookmark for {}", url);
            }
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.bookmarks.iter().any(|b| b.url == url)
    }

    pub fn clear_bookmarks(&self) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.bookmarks.clear();
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    // --- Visit log ---

    pub fn add_to_history(&self, title: &str, url: &str) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            push_history_entry(&mut state, title, url);
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    pub fn clear_history(&self) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.history.clear();
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    // --- Quick links ---

    /// Add a quick link, rejecting with `StoreError::QuickLinkLimit` once
    /// the cap is reached.
    pub fn add_quick_link(
        &self,
        title: &str,
        url: &str,
        icon: &str,
        color: &str,
    ) -> Result<String, StoreError> {
        let (id, snapshot) = {
            let mut state = self.state.lock().unwrap();
            if state.quick_links.len() >= QUICK_LINK_LIMIT {
                log::warn!("[QuickLinks] Rejected {}: limit of {} reached", url, QUICK_LINK_LIMIT);
                return Err(StoreError::QuickLinkLimit(QUICK_LINK_LIMIT));
            }
            let link = QuickLink {
                id: generate_id(),
                title: title.to_string(),
                url: url.to_string(),
                icon: icon.to_string(),
                color: color.to_string(),
            };
            let id = link.id.clone();
            state.quick_links.push(link);
            (id, snapshot_of(&state))
        };
        self.persist(snapshot);
        Ok(id)
    }

    pub fn remove_quick_link(&self, id: &str) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let before = state.quick_links.len();
            state.quick_links.retain(|l| l.id != id);
            if state.quick_links.len() == before {
                log::debug!("[QuickLinks] Remove ignored for unknown quick link {}", id);
                return;
            }
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    /// Update individual fields of a quick link. Unknown ids are a no-op.
    pub fn update_quick_link(&self, id: &str, patch: QuickLinkPatch) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let Some(link) = state.quick_links.iter_mut().find(|l| l.id == id) else {
                log::debug!("[QuickLinks] Update ignored for unknown quick link {}", id);
                return;
            };
            if let Some(title) = patch.title {
                link.title = title;
            }
            if let Some(url) = patch.url {
                link.url = url;
            }
            if let Some(icon) = patch.icon {
                link.icon = icon;
            }
            if let Some(color) = patch.color {
                link.color = color;
            }
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    // --- Settings ---

    pub fn set_theme(&self, theme: Theme) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.theme = theme;
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    pub fn complete_onboarding(&self) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.has_completed_onboarding = true;
            snapshot_of(&state)
        };
        self.persist(snapshot);
    }

    // --- Queries ---

    /// Whether the active tab is private. Derived, never stored.
    pub fn is_private_mode(&self) -> bool {
        private_mode_of(&self.state.lock().unwrap())
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.lock().unwrap().tabs.clone()
    }

    pub fn tab(&self, id: &str) -> Option<Tab> {
        let state = self.state.lock().unwrap();
        tabs::find(&state.tabs, id).cloned()
    }

    pub fn active_tab_id(&self) -> String {
        self.state.lock().unwrap().active_tab_id.clone()
    }

    pub fn active_tab(&self) -> Option<Tab> {
        let state = self.state.lock().unwrap();
        tabs::find(&state.tabs, &state.active_tab_id).cloned()
    }

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.state.lock().unwrap().bookmarks.clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().unwrap().history.clone()
    }

    pub fn quick_links(&self) -> Vec<QuickLink> {
        self.state.lock().unwrap().quick_links.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state.lock().unwrap().theme
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.state.lock().unwrap().has_completed_onboarding
    }
}
