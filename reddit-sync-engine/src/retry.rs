//! Retry policy as a decorator around any [`RemoteWriter`].
//!
//! The executor stays retry-agnostic: wrap the writer in a
//! [`RetryingWriter`] before handing it over.
//!
//! Only `Err(e)` with `e.is_retryable()` is retried. `Ok(_)` and permanent
//! errors return immediately. A call still throttled after the last attempt
//! collapses to `Ok(false)`, an ordinary rejection.

use std::time::Duration;

use reddit_sync_core::{settings::RetrySettings, types::FeedName};

use crate::error::RemoteError;
use crate::remote::RemoteWriter;

/// Exponential backoff schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(s: &RetrySettings) -> Self {
        Self {
            max_attempts: s.max_attempts.max(1),
            initial_backoff: Duration::from_millis(s.initial_backoff_ms),
            max_backoff: Duration::from_millis(s.max_backoff_ms),
            multiplier: s.multiplier,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based). Capped at `max_backoff`.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.max(1.0).powi(retry as i32 - 1);
        let millis = (self.initial_backoff.as_millis() as f64 * factor)
            .min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }
}

/// Blocking pause between attempts. Injectable so tests do not sleep.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// A [`RemoteWriter`] that retries transient failures of the inner writer.
pub struct RetryingWriter<W, S = ThreadSleeper> {
    inner: W,
    policy: RetryPolicy,
    sleeper: S,
}

impl<W: RemoteWriter> RetryingWriter<W> {
    pub fn new(inner: W, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleeper: ThreadSleeper,
        }
    }
}

impl<W: RemoteWriter, S: Sleeper> RetryingWriter<W, S> {
    pub fn with_sleeper(inner: W, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    fn run(
        &self,
        what: &str,
        call: impl Fn(&W) -> Result<bool, RemoteError>,
    ) -> Result<bool, RemoteError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match call(&self.inner) {
                Err(err) if err.is_retryable() && attempt < attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    tracing::warn!(
                        "{what}: {err}; retry {attempt}/{} in {}ms",
                        attempts - 1,
                        delay.as_millis()
                    );
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
                Err(RemoteError::Throttled) => {
                    tracing::warn!("{what}: still rate limited after {attempts} attempt(s)");
                    return Ok(false);
                }
                other => return other,
            }
        }
    }
}

impl<W: RemoteWriter, S: Sleeper> RemoteWriter for RetryingWriter<W, S> {
    fn subscribe(&self, feed: &FeedName) -> Result<bool, RemoteError> {
        self.run(&format!("subscribe r/{feed}"), |w| w.subscribe(feed))
    }

    fn unsubscribe(&self, feed: &FeedName) -> Result<bool, RemoteError> {
        self.run(&format!("unsubscribe r/{feed}"), |w| w.unsubscribe(feed))
    }

    fn create_collection(&self, name: &str, members: &[FeedName]) -> Result<bool, RemoteError> {
        self.run(&format!("create multi {name}"), |w| {
            w.create_collection(name, members)
        })
    }

    fn delete_collection(&self, name: &str) -> Result<bool, RemoteError> {
        self.run(&format!("delete multi {name}"), |w| w.delete_collection(name))
    }

    fn add_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError> {
        self.run(&format!("add r/{feed} to {collection}"), |w| {
            w.add_member(collection, feed)
        })
    }

    fn remove_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError> {
        self.run(&format!("remove r/{feed} from {collection}"), |w| {
            w.remove_member(collection, feed)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use reddit_sync_core::types::Collection;

    use super::*;

    /// Writer that replays scripted outcomes for `subscribe`.
    struct Scripted {
        outcomes: RefCell<VecDeque<Result<bool, RemoteError>>>,
        calls: RefCell<u32>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<bool, RemoteError>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                calls: RefCell::new(0),
            }
        }

        fn next(&self) -> Result<bool, RemoteError> {
            *self.calls.borrow_mut() += 1;
            self.outcomes.borrow_mut().pop_front().unwrap_or(Ok(true))
        }
    }

    impl RemoteWriter for Scripted {
        fn subscribe(&self, _: &FeedName) -> Result<bool, RemoteError> {
            self.next()
        }
        fn unsubscribe(&self, _: &FeedName) -> Result<bool, RemoteError> {
            self.next()
        }
        fn create_collection(&self, _: &str, _: &[FeedName]) -> Result<bool, RemoteError> {
            self.next()
        }
        fn delete_collection(&self, _: &str) -> Result<bool, RemoteError> {
            self.next()
        }
        fn add_member(&self, _: &str, _: &FeedName) -> Result<bool, RemoteError> {
            self.next()
        }
        fn remove_member(&self, _: &str, _: &FeedName) -> Result<bool, RemoteError> {
            self.next()
        }
    }

    #[derive(Default)]
    struct RecordingSleeper(RefCell<Vec<Duration>>);

    impl Sleeper for &RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.0.borrow_mut().push(duration);
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(250),
            multiplier: 2.0,
        }
    }

    #[test]
    fn backoff_grows_and_is_capped() {
        let p = policy(5);
        assert_eq!(p.backoff_for(0), Duration::ZERO);
        assert_eq!(p.backoff_for(1), Duration::from_millis(100));
        assert_eq!(p.backoff_for(2), Duration::from_millis(200));
        assert_eq!(p.backoff_for(3), Duration::from_millis(250));
    }

    #[test]
    fn policy_from_settings_never_allows_zero_attempts() {
        let settings = RetrySettings {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(RetryPolicy::from(&settings).max_attempts, 1);
    }

    #[test]
    fn retries_transient_errors_until_success() {
        let sleeper = RecordingSleeper::default();
        let writer = RetryingWriter::with_sleeper(
            Scripted::new(vec![Err(RemoteError::Throttled), Err(RemoteError::Status { status: 502 })]),
            policy(3),
            &sleeper,
        );
        assert_eq!(writer.subscribe(&FeedName::from("rust")), Ok(true));
        assert_eq!(*writer.inner().calls.borrow(), 3);
        assert_eq!(
            *sleeper.0.borrow(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[test]
    fn exhausted_throttling_collapses_to_rejection() {
        let sleeper = RecordingSleeper::default();
        let writer = RetryingWriter::with_sleeper(
            Scripted::new(vec![Err(RemoteError::Throttled); 3]),
            policy(2),
            &sleeper,
        );
        assert_eq!(writer.delete_collection("news"), Ok(false));
        assert_eq!(*writer.inner().calls.borrow(), 2);
    }

    #[test]
    fn exhausted_transport_errors_surface() {
        let sleeper = RecordingSleeper::default();
        let writer = RetryingWriter::with_sleeper(
            Scripted::new(vec![Err(RemoteError::Transport("reset".into())); 2]),
            policy(2),
            &sleeper,
        );
        assert!(matches!(
            writer.unsubscribe(&FeedName::from("rust")),
            Err(RemoteError::Transport(_))
        ));
    }

    #[test]
    fn permanent_errors_and_rejections_are_not_retried() {
        let sleeper = RecordingSleeper::default();
        let writer = RetryingWriter::with_sleeper(
            Scripted::new(vec![Ok(false), Err(RemoteError::Malformed("x".into()))]),
            policy(5),
            &sleeper,
        );
        let news = Collection::new("news", vec![]);
        assert_eq!(writer.create_collection(&news.name, &news.members), Ok(false));
        assert!(writer.add_member("news", &FeedName::from("rust")).is_err());
        assert_eq!(*writer.inner().calls.borrow(), 2);
        assert!(sleeper.0.borrow().is_empty());
    }
}
