// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, EpisodeQuery};
use crate::error::{ApiError, FeedError};
use crate::events::{FeedEvent, SharedFeedObserver};
use crate::feed::{AnnotatedEpisode, default_recency_window, enrich, select_feed};
use crate::http::HttpClient;
use crate::models::{NewReview, Rating};

/// Options for computing the feed
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Only episodes released within this window are shown
    pub recency_window: Duration,
    /// Number of latest episodes requested from the backend per refresh
    pub episode_limit: usize,
    /// Minimum time a refresh is reported as running; zero disables it
    pub min_refresh_duration: std::time::Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            recency_window: default_recency_window(),
            episode_limit: 50,
            min_refresh_duration: std::time::Duration::from_secs(1),
        }
    }
}

/// Result of a refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The feed was recomputed
    Refreshed { feed_size: usize },
    /// Another refresh was in flight; nothing was requested
    AlreadyRefreshing,
}

/// Effect of a successful single-episode mutation on the feed
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeUpdate {
    /// The episode was updated in place
    Updated(AnnotatedEpisode),
    /// The episode is now listened and rated and was removed from the feed
    Resolved(AnnotatedEpisode),
    /// The backend accepted the change but the episode is not in the feed
    NotInFeed,
}

#[derive(Debug, Default)]
struct FeedState {
    episodes: Vec<AnnotatedEpisode>,
    is_refreshing: bool,
    last_error: Option<String>,
}

/// Fetch episodes, listening history and reviews together and annotate the
/// episodes. Fails as soon as any of the three requests fails.
pub async fn fetch_annotated<C: HttpClient>(
    api: &ApiClient<C>,
    query: &EpisodeQuery,
) -> Result<Vec<AnnotatedEpisode>, ApiError> {
    let (episodes, history, reviews) = futures::try_join!(
        api.list_episodes(query),
        api.listening_history(),
        api.list_reviews(None),
    )?;

    debug!(
        episodes = episodes.len(),
        history = history.len(),
        reviews = reviews.len(),
        "fetched feed inputs"
    );

    Ok(enrich(episodes, &history, &reviews))
}

/// Owns the "needs attention" episode feed for one session.
///
/// The feed is only replaced by [`FeedController::refresh`] and edited one
/// episode at a time by [`FeedController::mark_listened`] and
/// [`FeedController::submit_review`]. A single-episode edit that lands while
/// a refresh is in flight can be overwritten when that refresh completes.
pub struct FeedController<C> {
    api: ApiClient<C>,
    options: FeedOptions,
    observer: SharedFeedObserver,
    state: Mutex<FeedState>,
}

/// Clears the refreshing flag when a refresh ends, including when its
/// future is dropped early
struct RefreshGuard<'a> {
    state: &'a Mutex<FeedState>,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).is_refreshing = false;
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C: HttpClient> FeedController<C> {
    pub fn new(api: ApiClient<C>, options: FeedOptions, observer: SharedFeedObserver) -> Self {
        Self {
            api,
            options,
            observer,
            state: Mutex::new(FeedState::default()),
        }
    }

    pub fn api(&self) -> &ApiClient<C> {
        &self.api
    }

    pub fn options(&self) -> &FeedOptions {
        &self.options
    }

    /// Snapshot of the current feed
    pub fn episodes(&self) -> Vec<AnnotatedEpisode> {
        lock(&self.state).episodes.clone()
    }

    /// Snapshot of a single feed entry
    pub fn episode(&self, episode_id: &str) -> Option<AnnotatedEpisode> {
        lock(&self.state)
            .episodes
            .iter()
            .find(|episode| episode.id() == episode_id)
            .cloned()
    }

    pub fn is_refreshing(&self) -> bool {
        lock(&self.state).is_refreshing
    }

    /// Message of the most recent failed refresh, cleared by a successful one
    pub fn last_error(&self) -> Option<String> {
        lock(&self.state).last_error.clone()
    }

    /// Recompute the feed from the backend.
    ///
    /// All three inputs must load for the feed to change; on failure the
    /// previous feed stays in place and the error is both returned and kept
    /// in [`FeedController::last_error`]. A call made while another refresh
    /// is running returns [`RefreshOutcome::AlreadyRefreshing`] right away.
    pub async fn refresh(&self) -> Result<RefreshOutcome, FeedError> {
        let _guard = {
            let mut state = lock(&self.state);
            if state.is_refreshing {
                debug!("refresh already in flight, skipping");
                drop(state);
                self.observer.notify(FeedEvent::RefreshSkipped);
                return Ok(RefreshOutcome::AlreadyRefreshing);
            }
            state.is_refreshing = true;
            RefreshGuard { state: &self.state }
        };

        self.observer.notify(FeedEvent::RefreshStarted);
        let started = Instant::now();

        let query = EpisodeQuery::latest(self.options.episode_limit);
        let result = fetch_annotated(&self.api, &query).await.map(|annotated| {
            let fetched = annotated.len();
            let feed = select_feed(annotated, Utc::now(), self.options.recency_window);
            (fetched, feed)
        });

        let outcome = match result {
            Ok((fetched, feed)) => {
                let feed_size = feed.len();
                {
                    let mut state = lock(&self.state);
                    state.episodes = feed;
                    state.last_error = None;
                }
                info!(fetched, feed_size, "feed refreshed");
                self.observer.notify(FeedEvent::RefreshCompleted { fetched, feed_size });
                Ok(RefreshOutcome::Refreshed { feed_size })
            }
            Err(e) => {
                let error = e.to_string();
                lock(&self.state).last_error = Some(error.clone());
                warn!(%error, "feed refresh failed");
                self.observer.notify(FeedEvent::RefreshFailed { error });
                Err(FeedError::Api(e))
            }
        };

        let remaining = self.options.min_refresh_duration.saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }

        outcome
    }

    /// Record that the episode was listened to and update its feed entry
    pub async fn mark_listened(&self, episode_id: &str) -> Result<EpisodeUpdate, FeedError> {
        if let Err(e) = self.api.mark_listened(episode_id).await {
            return Err(self.mutation_failed(episode_id, e));
        }

        self.observer.notify(FeedEvent::EpisodeListened {
            episode_id: episode_id.to_string(),
        });
        Ok(self.update_episode(episode_id, |episode| episode.listened = true))
    }

    /// Rate the episode (1 to 5) with an optional written review and update
    /// its feed entry
    pub async fn submit_review(
        &self,
        episode_id: &str,
        rating: u8,
        review: Option<&str>,
    ) -> Result<EpisodeUpdate, FeedError> {
        let rating = Rating::new(rating)?;
        let body = NewReview::new(episode_id, rating, review);

        if let Err(e) = self.api.submit_review(&body).await {
            return Err(self.mutation_failed(episode_id, e));
        }

        self.observer.notify(FeedEvent::EpisodeRated {
            episode_id: episode_id.to_string(),
            rating,
        });
        Ok(self.update_episode(episode_id, |episode| episode.rating = Some(rating)))
    }

    fn mutation_failed(&self, episode_id: &str, e: ApiError) -> FeedError {
        let error = e.to_string();
        warn!(episode_id, %error, "episode update failed");
        self.observer.notify(FeedEvent::EpisodeUpdateFailed {
            episode_id: episode_id.to_string(),
            error,
        });
        FeedError::Api(e)
    }

    /// Apply a change to one feed entry, dropping it once it is resolved
    fn update_episode<F>(&self, episode_id: &str, apply: F) -> EpisodeUpdate
    where
        F: FnOnce(&mut AnnotatedEpisode),
    {
        let mut state = lock(&self.state);
        let Some(index) = state
            .episodes
            .iter()
            .position(|episode| episode.id() == episode_id)
        else {
            debug!(episode_id, "updated episode is not in the feed");
            return EpisodeUpdate::NotInFeed;
        };

        apply(&mut state.episodes[index]);

        if state.episodes[index].is_resolved() {
            let resolved = state.episodes.remove(index);
            drop(state);
            debug!(episode_id, "episode resolved, removed from feed");
            self.observer.notify(FeedEvent::EpisodeResolved {
                episode_id: episode_id.to_string(),
            });
            EpisodeUpdate::Resolved(resolved)
        } else {
            EpisodeUpdate::Updated(state.episodes[index].clone())
        }
    }
}
