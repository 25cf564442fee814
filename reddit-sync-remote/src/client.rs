//! Old-reddit client implementing both remote surfaces.

use std::collections::HashSet;

use serde_json::json;

use reddit_sync_core::types::{Collection, FeedName};
use reddit_sync_engine::{RemoteError, RemoteReader, RemoteWriter};

use crate::parse;
use crate::session::{classify_write, HttpReply, Session};

const SUBSCRIPTIONS_PATH: &str = "/subreddits/mine/subscriber";
const MULTIS_PATH: &str = "/api/multi/mine";
const SUBSCRIBE_PATH: &str = "/api/subscribe";

/// Safety valve against a pagination loop on a misbehaving server.
const MAX_PAGES: usize = 200;

/// Reads and writes one account through its [`Session`].
pub struct RedditClient {
    session: Session,
    username: String,
}

impl RedditClient {
    pub fn new(session: Session, username: impl Into<String>) -> Self {
        Self {
            session,
            username: username.into(),
        }
    }

    fn multi_path(&self, name: &str) -> String {
        format!("/api/multi/user/{}/m/{}", self.username, name)
    }

    fn member_path(&self, collection: &str, feed: &FeedName) -> String {
        format!("{}/r/{}", self.multi_path(collection), feed)
    }

    /// Send a write with the current modhash. A 403 usually means the token
    /// went stale, so the token is refreshed and the write retried once.
    fn write(
        &self,
        ok: &[u16],
        send: impl Fn(&str) -> Result<HttpReply, RemoteError>,
    ) -> Result<bool, RemoteError> {
        let mut reply = send(&self.session.modhash()?)?;
        if reply.status == 403 {
            tracing::debug!("write forbidden, refreshing modhash");
            self.session.refresh_modhash();
            reply = send(&self.session.modhash()?)?;
        }
        classify_write(&reply, ok)
    }

    fn subscription_action(&self, action: &str, feed: &FeedName) -> Result<bool, RemoteError> {
        self.write(&[200], |uh| {
            self.session.post_form(
                SUBSCRIBE_PATH,
                &[("action", action), ("sr_name", feed.as_str()), ("uh", uh)],
            )
        })
    }
}

impl RemoteReader for RedditClient {
    fn list_subscribed_feeds(&self) -> Result<Vec<FeedName>, RemoteError> {
        let mut feeds = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(SUBSCRIPTIONS_PATH.to_string());

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) || visited.len() > MAX_PAGES {
                tracing::warn!(%url, "stopping subscription pagination");
                break;
            }
            let reply = self.session.get(&url)?;
            if parse::is_login_wall(&reply.url, &reply.body) {
                return Err(RemoteError::NotLoggedIn { url: reply.url });
            }
            if reply.status >= 400 {
                return Err(RemoteError::Status {
                    status: reply.status,
                });
            }
            let page = parse::parse_subscription_page(&reply.body);
            tracing::debug!(count = page.feeds.len(), "subscription page");
            feeds.extend(page.feeds);
            next = page.next;
        }

        feeds.sort();
        feeds.dedup();
        Ok(feeds)
    }

    fn list_collections(&self) -> Result<Vec<Collection>, RemoteError> {
        let reply = self.session.get(MULTIS_PATH)?;
        match reply.status {
            429 => return Err(RemoteError::Throttled),
            401 | 403 => return Err(RemoteError::NotLoggedIn { url: reply.url }),
            s if s >= 400 => return Err(RemoteError::Status { status: s }),
            _ => {}
        }
        parse::parse_multis(&reply.body)
    }
}

impl RemoteWriter for RedditClient {
    fn subscribe(&self, feed: &FeedName) -> Result<bool, RemoteError> {
        self.subscription_action("sub", feed)
    }

    fn unsubscribe(&self, feed: &FeedName) -> Result<bool, RemoteError> {
        self.subscription_action("unsub", feed)
    }

    fn create_collection(&self, name: &str, members: &[FeedName]) -> Result<bool, RemoteError> {
        let model = json!({
            "display_name": name,
            "subreddits": members.iter().map(|m| json!({"name": m.as_str()})).collect::<Vec<_>>(),
            "description_md": "",
            "visibility": "private",
        })
        .to_string();
        let path = self.multi_path(name);
        self.write(&[200, 201], |uh| {
            self.session
                .put_form(&path, &[("model", model.as_str()), ("uh", uh)])
        })
    }

    fn delete_collection(&self, name: &str) -> Result<bool, RemoteError> {
        let path = self.multi_path(name);
        self.write(&[200, 201, 204], |uh| {
            self.session.delete_form(&path, &[("uh", uh)])
        })
    }

    fn add_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError> {
        let model = json!({ "name": feed.as_str() }).to_string();
        let path = self.member_path(collection, feed);
        self.write(&[200, 201], |uh| {
            self.session
                .put_form(&path, &[("model", model.as_str()), ("uh", uh)])
        })
    }

    fn remove_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError> {
        let path = self.member_path(collection, feed);
        self.write(&[200, 201, 204], |uh| {
            self.session.delete_form(&path, &[("uh", uh)])
        })
    }
}
