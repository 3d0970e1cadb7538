// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use crate::models::Rating;

/// Events emitted by the feed controller so a front end can follow along
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A refresh cycle started
    RefreshStarted,

    /// A refresh was requested while another one was still running
    RefreshSkipped,

    /// The feed was replaced with freshly computed entries
    RefreshCompleted {
        /// Episodes returned by the backend before filtering
        fetched: usize,
        /// Episodes left in the feed
        feed_size: usize,
    },

    /// The refresh failed; the previous feed is still in place
    RefreshFailed { error: String },

    /// An episode was marked as listened
    EpisodeListened { episode_id: String },

    /// A rating was recorded for an episode
    EpisodeRated { episode_id: String, rating: Rating },

    /// An episode is now listened and rated and left the feed
    EpisodeResolved { episode_id: String },

    /// Marking as listened or rating an episode failed
    EpisodeUpdateFailed { episode_id: String, error: String },
}

/// Trait for observing feed controller events.
///
/// Implementations can use this to drive spinners, print messages,
/// or collect statistics.
pub trait FeedObserver: Send + Sync {
    /// Handle an event
    fn notify(&self, event: FeedEvent);
}

/// A shared reference to a feed observer
pub type SharedFeedObserver = Arc<dyn FeedObserver>;

/// An observer that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FeedObserver for NoopObserver {
    fn notify(&self, _event: FeedEvent) {}
}

impl NoopObserver {
    /// Create a new NoopObserver wrapped in an Arc
    pub fn shared() -> SharedFeedObserver {
        Arc::new(Self)
    }
}

/// Keeps every event it sees, in order
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    events: std::sync::Mutex<Vec<FeedEvent>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn events(&self) -> Vec<FeedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl FeedObserver for RecordingObserver {
    fn notify(&self, event: FeedEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_observer_handles_all_events() {
        let observer = NoopObserver;

        observer.notify(FeedEvent::RefreshStarted);
        observer.notify(FeedEvent::RefreshSkipped);
        observer.notify(FeedEvent::RefreshCompleted {
            fetched: 50,
            feed_size: 3,
        });
        observer.notify(FeedEvent::RefreshFailed {
            error: "HTTP error 500".to_string(),
        });
        observer.notify(FeedEvent::EpisodeListened {
            episode_id: "e1".to_string(),
        });
        observer.notify(FeedEvent::EpisodeRated {
            episode_id: "e1".to_string(),
            rating: Rating::new(4).unwrap(),
        });
        observer.notify(FeedEvent::EpisodeResolved {
            episode_id: "e1".to_string(),
        });
        observer.notify(FeedEvent::EpisodeUpdateFailed {
            episode_id: "e2".to_string(),
            error: "Connection refused".to_string(),
        });
    }

    #[test]
    fn recording_observer_keeps_order() {
        let observer = RecordingObserver::default();

        observer.notify(FeedEvent::RefreshStarted);
        observer.notify(FeedEvent::RefreshSkipped);

        assert_eq!(
            observer.events(),
            vec![FeedEvent::RefreshStarted, FeedEvent::RefreshSkipped]
        );
    }
}
