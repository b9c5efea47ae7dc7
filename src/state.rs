// Shared state structs to avoid circular dependencies.
// These are used by the store and can be tested independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved URL for the internal new-tab page. Compared by exact string
/// equality everywhere; never written to the visit log, never bookmarkable.
pub const NEW_TAB_URL: &str = "internal://newtab";

/// Display title for the new-tab page.
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Provisional title shown between navigation start and title resolution.
pub const LOADING_TITLE: &str = "Loading…";

/// Fresh opaque id. Ids are generated, never user-supplied, never reused.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub url: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-tab back/forward stack: an ordered entry list plus the current
/// position. Invariant: `entries` is non-empty and
/// `current_index < entries.len()` for every reachable value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationHistory {
    pub entries: Vec<NavigationEntry>,
    pub current_index: usize,
}

impl NavigationHistory {
    /// Single-entry history pointing at its seed.
    pub fn seeded(url: &str, title: &str) -> Self {
        Self {
            entries: vec![NavigationEntry {
                url: url.to_string(),
                title: title.to_string(),
                timestamp: Utc::now(),
            }],
            current_index: 0,
        }
    }

    pub fn current(&self) -> &NavigationEntry {
        &self.entries[self.current_index]
    }

    /// Standard browser semantics: drop any forward entries, append the new
    /// one, and advance the index to point at it.
    pub fn push(&mut self, url: &str, title: &str) {
        self.entries.truncate(self.current_index + 1);
        self.entries.push(NavigationEntry {
            url: url.to_string(),
            title: title.to_string(),
            timestamp: Utc::now(),
        });
        self.current_index = self.entries.len() - 1;
    }

    /// Retitle the entry at the current position (applied when a pending
    /// resolution completes for it).
    pub fn retitle_current(&mut self, title: &str) {
        self.entries[self.current_index].title = title.to_string();
    }

    pub fn can_go_back(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }

    /// Move one step back. Returns the entry now pointed at, or `None` at the
    /// boundary. Never mutates `entries`.
    pub fn go_back(&mut self) -> Option<&NavigationEntry> {
        if !self.can_go_back() {
            return None;
        }
        self.current_index -= 1;
        Some(&self.entries[self.current_index])
    }

    /// Move one step forward. Returns the entry now pointed at, or `None` at
    /// the boundary. Never mutates `entries`.
    pub fn go_forward(&mut self) -> Option<&NavigationEntry> {
        if !self.can_go_forward() {
            return None;
        }
        self.current_index += 1;
        Some(&self.entries[self.current_index])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
    pub is_loading: bool,
    pub is_active: bool,
    pub is_private: bool,
    pub navigation_history: NavigationHistory,
    /// Monotonic per-tab navigation sequence. A pending title resolution
    /// captures this at issue time and applies only while it still matches,
    /// so stale resolutions become silent no-ops.
    #[serde(skip)]
    pub nav_seq: u64,
}

impl Tab {
    /// New tab seeded with a single-entry history. The sentinel seeds the
    /// "New Tab" title; any other URL uses the raw URL as provisional title
    /// until a navigation resolves it.
    pub fn new(url: &str, is_private: bool) -> Self {
        let title = if url == NEW_TAB_URL { NEW_TAB_TITLE } else { url };
        Self {
            id: generate_id(),
            title: title.to_string(),
            url: url.to_string(),
            is_loading: false,
            is_active: true,
            is_private,
            navigation_history: NavigationHistory::seeded(url, title),
            nav_seq: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub visited_at: DateTime<Utc>,
}

/// User-curated shortcut shown on the new-tab page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickLink {
    pub id: String,
    pub title: String,
    pub url: String,
    pub icon: String,
    pub color: String,
}

/// Bookmarks shipped on first launch, before the user has saved anything.
pub fn default_bookmarks() -> Vec<Bookmark> {
    [("Google", "https://google.com"), ("GitHub", "https://github.com")]
        .iter()
        .map(|(title, url)| Bookmark {
            id: generate_id(),
            title: title.to_string(),
            url: url.to_string(),
            created_at: Utc::now(),
        })
        .collect()
}

/// Quick links shipped on first launch.
pub fn default_quick_links() -> Vec<QuickLink> {
    [
        ("Google", "https://google.com", "G", "#3B82F6"),
        ("Wikipedia", "https://wikipedia.org", "W", "#6B7280"),
        ("Amazon", "https://amazon.com", "A", "#F97316"),
        ("Facebook", "https://facebook.com", "F", "#1877F2"),
        ("X", "https://x.com", "X", "#000000"),
        ("YouTube", "https://youtube.com", "Y", "#EF4444"),
    ]
    .iter()
    .map(|(title, url, icon, color)| QuickLink {
        id: generate_id(),
        title: title.to_string(),
        url: url.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_history_points_at_seed() {
        let history = NavigationHistory::seeded(NEW_TAB_URL, NEW_TAB_TITLE);
        assert_eq!(history.entries.len(), 1);
        assert_eq!(history.current_index, 0);
        assert_eq!(history.current().url, NEW_TAB_URL);
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_push_appends_and_advances() {
        let mut history = NavigationHistory::seeded(NEW_TAB_URL, NEW_TAB_TITLE);
        history.push("https://example.com", LOADING_TITLE);

        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.current_index, 1);
        assert_eq!(history.current().url, "https://example.com");
        assert!(history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_push_after_back_truncates_forward_entries() {
        let mut history = NavigationHistory::seeded(NEW_TAB_URL, NEW_TAB_TITLE);
        history.push("https://a.com", LOADING_TITLE);
        history.push("https://b.com", LOADING_TITLE);
        history.go_back();
        history.push("https://c.com", LOADING_TITLE);

        // Forward history (b.com) is discarded: seed, a, c.
        let urls: Vec<&str> = history.entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec![NEW_TAB_URL, "https://a.com", "https://c.com"]);
        assert_eq!(history.current_index, 2);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_back_and_forward_stay_in_bounds() {
        let mut history = NavigationHistory::seeded(NEW_TAB_URL, NEW_TAB_TITLE);
        history.push("https://a.com", LOADING_TITLE);

        assert_eq!(history.go_back().map(|e| e.url.clone()), Some(NEW_TAB_URL.to_string()));
        assert!(history.go_back().is_none()); // already at the oldest entry
        assert_eq!(history.current_index, 0);

        assert_eq!(
            history.go_forward().map(|e| e.url.clone()),
            Some("https://a.com".to_string())
        );
        assert!(history.go_forward().is_none()); // already at the newest entry
        assert_eq!(history.current_index, 1);
        assert_eq!(history.entries.len(), 2); // moves never mutate entries
    }

    #[test]
    fn test_new_tab_uses_sentinel_title() {
        let tab = Tab::new(NEW_TAB_URL, false);
        assert_eq!(tab.title, NEW_TAB_TITLE);
        assert_eq!(tab.url, NEW_TAB_URL);
        assert!(tab.is_active);
        assert!(!tab.is_private);
        assert_eq!(tab.navigation_history.entries.len(), 1);
    }

    #[test]
    fn test_new_tab_with_real_url_uses_url_as_title() {
        let tab = Tab::new("https://example.com", true);
        assert_eq!(tab.title, "https://example.com");
        assert!(tab.is_private);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::from_str::<Theme>("\"dark\"").unwrap(), Theme::Dark);
    }
}
