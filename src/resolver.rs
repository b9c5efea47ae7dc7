// Simulated fetch/render collaborator. A real implementation would replace
// this with an actual network and page-rendering layer; the store only ever
// calls `resolve` and awaits the display title.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::state::{NEW_TAB_TITLE, NEW_TAB_URL};

/// How long the simulated page load takes before the title resolves.
pub const RESOLUTION_DELAY: Duration = Duration::from_millis(1000);

/// Well-known sites with fixed display titles. Matched against the parsed
/// host by exact domain or dot-suffix, so `netflix.com` can never collide
/// with the `x.com` entry.
const KNOWN_SITES: &[(&str, &str)] = &[
    ("google.com", "Google"),
    ("github.com", "GitHub"),
    ("stackoverflow.com", "Stack Overflow"),
    ("youtube.com", "YouTube"),
    ("wikipedia.org", "Wikipedia"),
    ("facebook.com", "Facebook"),
    ("twitter.com", "X (Twitter)"),
    ("x.com", "X (Twitter)"),
    ("amazon.com", "Amazon"),
    ("netflix.com", "Netflix"),
    ("spotify.com", "Spotify"),
    ("reddit.com", "Reddit"),
];

/// Deterministic URL → display title mapping. Falls back to the parsed
/// hostname, or to the raw input string when the URL does not parse.
pub fn resolve_title(url: &str) -> String {
    if url == NEW_TAB_URL {
        return NEW_TAB_TITLE.to_string();
    }

    let host = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_string(),
            None => return url.to_string(),
        },
        Err(_) => return url.to_string(),
    };

    for (domain, title) in KNOWN_SITES {
        if host == *domain || host.ends_with(&format!(".{}", domain)) {
            return title.to_string();
        }
    }

    host
}

/// Yields a display title for a URL, asynchronously.
#[async_trait]
pub trait TitleResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> String;
}

/// Production resolver: fixed delay standing in for the network fetch and
/// render, then the deterministic title mapping.
#[derive(Default)]
pub struct FixedDelayResolver;

#[async_trait]
impl TitleResolver for FixedDelayResolver {
    async fn resolve(&self, url: &str) -> String {
        tokio::time::sleep(RESOLUTION_DELAY).await;
        resolve_title(url)
    }
}

/// Resolves immediately. For tests and embedders that want no timers.
#[derive(Default)]
pub struct InstantResolver;

#[async_trait]
impl TitleResolver for InstantResolver {
    async fn resolve(&self, url: &str) -> String {
        resolve_title(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // Well-known sites
    #[case("https://google.com", "Google")]
    #[case("https://www.google.com/search?q=rust", "Google")]
    #[case("https://github.com/rust-lang/rust", "GitHub")]
    #[case("https://stackoverflow.com/questions", "Stack Overflow")]
    #[case("https://youtube.com", "YouTube")]
    #[case("https://en.wikipedia.org/wiki/Rust", "Wikipedia")]
    #[case("https://facebook.com", "Facebook")]
    #[case("https://twitter.com/home", "X (Twitter)")]
    #[case("https://x.com/home", "X (Twitter)")]
    #[case("https://amazon.com", "Amazon")]
    #[case("https://netflix.com", "Netflix")]
    #[case("https://www.netflix.com/browse", "Netflix")]
    #[case("https://spotify.com", "Spotify")]
    #[case("https://reddit.com/r/rust", "Reddit")]
    // New-tab sentinel
    #[case("internal://newtab", "New Tab")]
    // Unknown hosts fall back to the hostname
    #[case("https://docs.rs/serde", "docs.rs")]
    #[case("https://sub.example.co.uk/path", "sub.example.co.uk")]
    fn test_resolve_title(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(resolve_title(url), expected);
    }

    #[rstest]
    // Unparseable input falls back to the raw string
    #[case("not a url")]
    #[case("")]
    fn test_unparseable_url_yields_raw_string(#[case] input: &str) {
        assert_eq!(resolve_title(input), input);
    }

    #[test]
    fn test_hostless_url_yields_raw_string() {
        assert_eq!(resolve_title("data:text/plain,hi"), "data:text/plain,hi");
    }

    #[tokio::test]
    async fn test_instant_resolver_matches_mapping() {
        let resolver = InstantResolver;
        assert_eq!(resolver.resolve("https://github.com").await, "GitHub");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_resolver_waits_full_delay() {
        let resolver = FixedDelayResolver;
        let started = tokio::time::Instant::now();
        let title = resolver.resolve("https://github.com").await;
        assert_eq!(title, "GitHub");
        assert_eq!(started.elapsed(), RESOLUTION_DELAY);
    }
}
