// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::enrich::AnnotatedEpisode;

/// Case-insensitive substring search over episode names and descriptions.
/// A blank query matches everything.
pub fn search_episodes<'a>(episodes: &'a [AnnotatedEpisode], query: &str) -> Vec<&'a AnnotatedEpisode> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return episodes.iter().collect();
    }

    episodes
        .iter()
        .filter(|annotated| {
            let episode = &annotated.episode;
            episode.name.to_lowercase().contains(&needle)
                || episode
                    .description
                    .as_deref()
                    .is_some_and(|description| description.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::enrich::enrich;
    use crate::feed::enrich::fixtures::episode;

    fn catalog() -> Vec<AnnotatedEpisode> {
        let mut first = episode("e1", None);
        first.name = "Ownership in Practice".to_string();
        first.description = Some("Borrowing without tears".to_string());

        let mut second = episode("e2", None);
        second.name = "Async Deep Dive".to_string();
        second.description = None;

        enrich(vec![first, second], &[], &[])
    }

    #[test]
    fn blank_query_returns_all() {
        let episodes = catalog();
        assert_eq!(search_episodes(&episodes, "  ").len(), 2);
    }

    #[test]
    fn matches_name_case_insensitively() {
        let episodes = catalog();
        let hits = search_episodes(&episodes, "ASYNC");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), "e2");
    }

    #[test]
    fn matches_description() {
        let episodes = catalog();
        let hits = search_episodes(&episodes, "borrowing");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), "e1");
    }

    #[test]
    fn no_match_returns_empty() {
        let episodes = catalog();
        assert!(search_episodes(&episodes, "macros").is_empty());
    }
}
