//! Per-account HTTP session.
//!
//! A [`Session`] owns the `reddit_session` cookie, a paced `ureq` agent, and
//! the modhash (CSRF) token. The token is fetched on the first write and
//! cached; [`Session::refresh_modhash`] drops it so the next write fetches a
//! new one.

use std::cell::RefCell;
use std::time::Duration;

use reddit_sync_core::Settings;
use reddit_sync_engine::RemoteError;

use crate::parse;

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    /// URL after redirects.
    pub url: String,
    pub body: String,
}

impl HttpReply {
    fn read(response: ureq::Response) -> Result<Self, RemoteError> {
        let status = response.status();
        let url = response.get_url().to_string();
        let body = response
            .into_string()
            .map_err(|e| RemoteError::Transport(format!("reading response body: {e}")))?;
        Ok(Self { status, url, body })
    }
}

/// Map a write reply to the writer contract: `ok` statuses are success,
/// 429 and 5xx are retryable errors, anything else is a plain rejection.
pub fn classify_write(reply: &HttpReply, ok: &[u16]) -> Result<bool, RemoteError> {
    match reply.status {
        s if ok.contains(&s) => Ok(true),
        429 => Err(RemoteError::Throttled),
        s if s >= 500 => Err(RemoteError::Status { status: s }),
        s => {
            let preview: String = reply.body.chars().take(200).collect();
            tracing::debug!(status = s, body = %preview, "write rejected");
            Ok(false)
        }
    }
}

enum Body<'a> {
    Empty,
    Form(&'a [(&'a str, &'a str)]),
}

/// Authenticated session for one account.
pub struct Session {
    agent: ureq::Agent,
    cookie: String,
    base_url: String,
    delay: Duration,
    modhash: RefCell<Option<String>>,
}

impl Session {
    pub fn new(cookie: impl Into<String>, settings: &Settings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(&settings.user_agent)
            .timeout(settings.timeout())
            .build();
        Self {
            agent,
            cookie: cookie.into(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            delay: settings.request_delay(),
            modhash: RefCell::new(None),
        }
    }

    /// Absolute URL for `path_or_url`; absolute URLs pass through.
    pub fn url(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}{}", self.base_url, path_or_url)
        }
    }

    pub fn get(&self, path: &str) -> Result<HttpReply, RemoteError> {
        self.send("GET", path, Body::Empty)
    }

    pub fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpReply, RemoteError> {
        self.send("POST", path, Body::Form(form))
    }

    pub fn put_form(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpReply, RemoteError> {
        self.send("PUT", path, Body::Form(form))
    }

    pub fn delete_form(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpReply, RemoteError> {
        self.send("DELETE", path, Body::Form(form))
    }

    fn send(&self, method: &str, path: &str, body: Body<'_>) -> Result<HttpReply, RemoteError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let url = self.url(path);
        tracing::debug!(%method, %url, "request");

        let request = self
            .agent
            .request(method, &url)
            .set("Cookie", &format!("reddit_session={}", self.cookie));
        let result = match body {
            Body::Empty => request.call(),
            Body::Form(form) => request.send_form(form),
        };
        match result {
            Ok(response) | Err(ureq::Error::Status(_, response)) => HttpReply::read(response),
            Err(ureq::Error::Transport(t)) => Err(RemoteError::Transport(t.to_string())),
        }
    }

    /// The modhash token, fetched on first use.
    ///
    /// Looks in the front page HTML first, then `/api/me.json`. When neither
    /// has one, writes go out with an empty token and will likely be rejected.
    pub fn modhash(&self) -> Result<String, RemoteError> {
        if let Some(cached) = self.modhash.borrow().as_ref() {
            return Ok(cached.clone());
        }

        let front = self.get("/")?;
        let token = match parse::extract_modhash(&front.body) {
            Some(token) => Some(token),
            None => {
                let me = self.get("/api/me.json")?;
                parse::modhash_from_me_json(&me.body)
            }
        };

        let token = match token {
            Some(token) => {
                tracing::info!("got modhash token");
                token
            }
            None => {
                tracing::warn!("no modhash found, write actions may fail");
                String::new()
            }
        };
        *self.modhash.borrow_mut() = Some(token.clone());
        Ok(token)
    }

    /// Forget the cached token.
    pub fn refresh_modhash(&self) {
        self.modhash.borrow_mut().take();
    }
}
