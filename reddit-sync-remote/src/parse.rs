//! Response parsing for old-reddit pages and the multireddit JSON API.
//!
//! Pure functions over response bodies so they can be tested without a
//! network.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use reddit_sync_core::types::{Collection, FeedName};
use reddit_sync_engine::RemoteError;

static MODHASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"modhash["\s:]+([a-z0-9]+)"#).expect("MODHASH is a valid regex pattern")
});

/// An `<a ...>` opening tag.
static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a\s[^>]*>").expect("ANCHOR is a valid regex pattern"));

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class\s*=\s*"([^"]*)""#).expect("CLASS_ATTR is a valid regex pattern")
});

static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href\s*=\s*"([^"]*)""#).expect("HREF_ATTR is a valid regex pattern")
});

/// `/r/<name>` at the end of a link; `\w+` keeps `a+b` combined links out.
static SUBREDDIT_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/r/(\w+)/?$").expect("SUBREDDIT_HREF is a valid regex pattern")
});

static NEXT_BUTTON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="next-button"[^>]*>\s*<a\s[^>]*href="([^"]+)""#)
        .expect("NEXT_BUTTON is a valid regex pattern")
});

/// One page of `/subreddits/mine/subscriber`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionPage {
    pub feeds: Vec<FeedName>,
    pub next: Option<String>,
}

/// Pull the modhash token out of an HTML page.
pub fn extract_modhash(html: &str) -> Option<String> {
    MODHASH
        .captures(html)
        .map(|c| c[1].to_string())
        .filter(|m| !m.is_empty())
}

#[derive(Deserialize)]
struct MeEnvelope {
    #[serde(default)]
    data: MeData,
}

#[derive(Deserialize, Default)]
struct MeData {
    #[serde(default)]
    modhash: Option<String>,
}

/// Modhash from `/api/me.json`.
pub fn modhash_from_me_json(body: &str) -> Option<String> {
    serde_json::from_str::<MeEnvelope>(body)
        .ok()
        .and_then(|me| me.data.modhash)
        .filter(|m| !m.is_empty())
}

/// Whether a response is the login wall rather than the requested page.
pub fn is_login_wall(final_url: &str, body: &str) -> bool {
    final_url.contains("/login") || body.to_lowercase().contains("you must be logged in")
}

fn subreddit_links<'a>(html: &'a str, anchor_class: &'a str) -> impl Iterator<Item = FeedName> + 'a {
    ANCHOR.find_iter(html).filter_map(move |tag| {
        let tag = tag.as_str();
        let classes = CLASS_ATTR.captures(tag)?;
        if !classes[1].split_whitespace().any(|c| c == anchor_class) {
            return None;
        }
        let href = HREF_ATTR.captures(tag)?;
        let name = SUBREDDIT_HREF.captures(&href[1])?;
        Some(FeedName::from(&name[1]))
    })
}

/// Parse one subscriptions page.
///
/// Links are read from the `subscription-box` section when present, and from
/// any `a.title` link otherwise.
pub fn parse_subscription_page(html: &str) -> SubscriptionPage {
    let scoped = html
        .find("subscription-box")
        .map(|start| &html[start..])
        .unwrap_or(html);
    let mut feeds: Vec<FeedName> = subreddit_links(scoped, "title").collect();
    if feeds.is_empty() && scoped.len() != html.len() {
        feeds = subreddit_links(html, "title").collect();
    }
    let next = NEXT_BUTTON
        .captures(html)
        .map(|c| c[1].replace("&amp;", "&"));
    SubscriptionPage { feeds, next }
}

#[derive(Deserialize)]
struct MultiEnvelope {
    #[serde(default)]
    data: MultiData,
}

#[derive(Deserialize, Default)]
struct MultiData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    subreddits: Vec<MultiMember>,
}

#[derive(Deserialize)]
struct MultiMember {
    #[serde(default)]
    name: String,
}

/// Parse `/api/multi/mine`. Unnamed entries and blank members are dropped;
/// members are sorted.
pub fn parse_multis(body: &str) -> Result<Vec<Collection>, RemoteError> {
    let envelopes: Vec<MultiEnvelope> = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        RemoteError::Malformed(format!("multireddit list: {e} (body: {preview})"))
    })?;
    Ok(envelopes
        .into_iter()
        .filter(|m| !m.data.name.is_empty())
        .map(|m| {
            let mut members: Vec<FeedName> = m
                .data
                .subreddits
                .into_iter()
                .filter(|s| !s.name.is_empty())
                .map(|s| FeedName(s.name))
                .collect();
            members.sort();
            Collection::new(m.data.name, members)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use reddit_sync_core::types::feeds;

    use super::*;

    const PAGE: &str = r#"
<html><body>
<script>var r = {"config": {"modhash": "abc123def"}};</script>
<div class="subscription-box">
  <ul>
    <li><a class="title" href="https://old.reddit.com/r/rust/">rust</a></li>
    <li><a href="https://old.reddit.com/r/golang/" class="title may-blank">golang</a></li>
    <li><a class="title" href="https://old.reddit.com/r/a+b/">combined</a></li>
    <li><a class="other" href="https://old.reddit.com/r/ignored/">x</a></li>
  </ul>
</div>
<span class="next-button"><a href="https://old.reddit.com/subreddits/mine/subscriber?count=100&amp;after=t5_x" rel="next">next</a></span>
</body></html>"#;

    #[test]
    fn extracts_modhash_from_html() {
        assert_eq!(extract_modhash(PAGE).as_deref(), Some("abc123def"));
        assert_eq!(extract_modhash("<html></html>"), None);
    }

    #[test]
    fn extracts_modhash_from_me_json() {
        assert_eq!(
            modhash_from_me_json(r#"{"data":{"modhash":"xyz"}}"#).as_deref(),
            Some("xyz")
        );
        assert_eq!(modhash_from_me_json(r#"{"data":{"modhash":""}}"#), None);
        assert_eq!(modhash_from_me_json("not json"), None);
    }

    #[test]
    fn parses_subscription_links_and_next_page() {
        let page = parse_subscription_page(PAGE);
        assert_eq!(page.feeds, feeds(["rust", "golang"]));
        assert_eq!(
            page.next.as_deref(),
            Some("https://old.reddit.com/subreddits/mine/subscriber?count=100&after=t5_x")
        );
    }

    #[test]
    fn falls_back_to_title_links_outside_subscription_box() {
        let html = r#"<a class="title" href="/r/aww">aww</a>"#;
        let page = parse_subscription_page(html);
        assert_eq!(page.feeds, feeds(["aww"]));
        assert!(page.next.is_none());
    }

    #[test]
    fn detects_login_wall() {
        assert!(is_login_wall("https://old.reddit.com/login?dest=x", ""));
        assert!(is_login_wall("https://old.reddit.com/", "You must be logged in to do that"));
        assert!(!is_login_wall("https://old.reddit.com/subreddits/mine", PAGE));
    }

    #[test]
    fn parses_multis_skipping_malformed_entries() {
        let body = r#"[
            {"data": {"name": "news", "subreddits": [{"name": "worldnews"}, {"name": ""}, {"name": "Politics"}]}},
            {"data": {"name": "", "subreddits": [{"name": "x"}]}},
            {"data": {"name": "empty"}},
            {"kind": "LabeledMulti"}
        ]"#;
        let multis = parse_multis(body).expect("parse");
        assert_eq!(
            multis,
            vec![
                Collection::new("news", feeds(["Politics", "worldnews"])),
                Collection::new("empty", vec![]),
            ]
        );
    }

    #[test]
    fn malformed_multis_body_is_an_error() {
        let err = parse_multis("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, RemoteError::Malformed(_)));
    }
}
