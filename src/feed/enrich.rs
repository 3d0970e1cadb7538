// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{Episode, ListeningHistoryRecord, Rating, ReviewRecord};

/// An episode together with what the user has done with it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedEpisode {
    #[serde(flatten)]
    pub episode: Episode,
    pub listened: bool,
    pub rating: Option<Rating>,
}

/// Which action an episode is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    /// Not listened yet (whether or not it was rated)
    Unlistened,
    /// Listened, waiting for a rating
    ListenedUnrated,
    /// Listened and rated; nothing left to do
    ListenedRated,
}

impl AnnotatedEpisode {
    pub fn id(&self) -> &str {
        &self.episode.id
    }

    /// Both listened and rated
    pub fn is_resolved(&self) -> bool {
        self.listened && self.rating.is_some()
    }

    pub fn state(&self) -> EpisodeState {
        match (self.listened, self.rating) {
            (false, _) => EpisodeState::Unlistened,
            (true, None) => EpisodeState::ListenedUnrated,
            (true, Some(_)) => EpisodeState::ListenedRated,
        }
    }
}

/// Lookup tables built from a user's listening history and reviews
#[derive(Debug, Clone, Default)]
pub struct UserActivity {
    /// IDs of episodes the user has listened to
    pub listened: HashSet<String>,
    /// Rating per episode ID
    pub ratings: HashMap<String, Rating>,
}

impl UserActivity {
    /// Build the lookups. Duplicate history entries collapse into one; when
    /// several reviews exist for an episode the one listed last wins.
    pub fn from_records(history: &[ListeningHistoryRecord], reviews: &[ReviewRecord]) -> Self {
        let listened = history
            .iter()
            .map(|record| record.episode_id.clone())
            .collect();

        let mut ratings = HashMap::with_capacity(reviews.len());
        for review in reviews {
            ratings.insert(review.episode_id.clone(), review.rating);
        }

        Self { listened, ratings }
    }

    /// Attach the listened flag and rating to an episode, replacing any
    /// previous annotation
    pub fn annotate(&self, episode: Episode) -> AnnotatedEpisode {
        let listened = self.listened.contains(&episode.id);
        let rating = self.ratings.get(&episode.id).copied();

        AnnotatedEpisode {
            episode,
            listened,
            rating,
        }
    }
}

/// Annotate episodes with listening history and ratings, preserving order
pub fn enrich(
    episodes: Vec<Episode>,
    history: &[ListeningHistoryRecord],
    reviews: &[ReviewRecord],
) -> Vec<AnnotatedEpisode> {
    let activity = UserActivity::from_records(history, reviews);

    episodes
        .into_iter()
        .map(|episode| activity.annotate(episode))
        .collect()
}
