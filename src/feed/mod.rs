// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod enrich;
mod filter;
mod search;

pub use enrich::{AnnotatedEpisode, EpisodeState, UserActivity, enrich};
pub use filter::{default_recency_window, needs_attention, recency_threshold, select_feed};
pub use search::search_episodes;
