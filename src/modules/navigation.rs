// Pure navigation logic - address input normalization.
// This is the contract at the UI boundary: the presentation layer runs the
// typed input through here before calling the store's navigate operation.

use serde::{Deserialize, Serialize};

use crate::state::NEW_TAB_URL;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SearchEngine {
    #[default]
    Google,
    DuckDuckGo,
    Bing,
    Brave,
}

impl SearchEngine {
    pub fn query_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            Self::Google => format!("https://www.google.com/search?q={}", q),
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={}", q),
            Self::Bing => format!("https://bing.com/search?q={}", q),
            Self::Brave => format!("https://search.brave.com/search?q={}", q),
        }
    }
}

/// Turn raw address-bar input into a navigable URL.
///
/// 1. Empty input opens the new-tab page.
/// 2. Input with no dot, or containing a space, is a search query routed
///    through the search engine with the query percent-encoded.
/// 3. Scheme-less input gets an `https://` prefix.
/// 4. Anything else passes through unchanged (including the new-tab
///    sentinel).
pub fn smart_parse_url(input: &str, engine: SearchEngine) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return NEW_TAB_URL.to_string();
    }
    if trimmed == NEW_TAB_URL {
        return trimmed.to_string();
    }

    if !trimmed.contains('.') || trimmed.contains(' ') {
        return engine.query_url(trimmed);
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return format!("https://{}", trimmed);
    }

    trimmed.to_string()
}
