// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod api;
pub mod controller;
pub mod error;
pub mod events;
pub mod feed;
pub mod http;
pub mod models;

// Re-export main types for convenience
pub use api::{ApiClient, DEFAULT_API_URL, EpisodeQuery};
pub use controller::{EpisodeUpdate, FeedController, FeedOptions, RefreshOutcome, fetch_annotated};
pub use error::{ApiError, FeedError, RatingError};
pub use events::{FeedEvent, FeedObserver, NoopObserver, SharedFeedObserver};
pub use feed::{
    AnnotatedEpisode, EpisodeState, UserActivity, enrich, needs_attention, search_episodes,
    select_feed,
};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use models::{
    AddShowResponse, AddShowStatus, Episode, Image, ListeningHistoryRecord, MonthlyCount,
    NewReview, Rating, RefreshShowResponse, ReviewRecord, Show, Stats,
};
