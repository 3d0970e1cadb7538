// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Duration, Utc};

use super::enrich::AnnotatedEpisode;

/// Default trailing window of release dates eligible for the feed
pub fn default_recency_window() -> Duration {
    Duration::days(2)
}

/// Oldest release date still eligible for the feed
pub fn recency_threshold(now: DateTime<Utc>, recency_window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(recency_window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Whether an episode still needs attention: released within the window
/// (inclusive) and not yet both listened and rated. Episodes without a
/// release date never qualify.
pub fn needs_attention(episode: &AnnotatedEpisode, threshold: DateTime<Utc>) -> bool {
    let is_recent = episode
        .episode
        .release_date
        .is_some_and(|released| released >= threshold);

    is_recent && !episode.is_resolved()
}

/// Select the episodes that belong in the feed, preserving order
pub fn select_feed(
    annotated: Vec<AnnotatedEpisode>,
    now: DateTime<Utc>,
    recency_window: Duration,
) -> Vec<AnnotatedEpisode> {
    let threshold = recency_threshold(now, recency_window);

    annotated
        .into_iter()
        .filter(|episode| needs_attention(episode, threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::enrich::enrich;
    use crate::feed::enrich::fixtures::{episode, listened, review};
    use crate::models::Rating;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let window = default_recency_window();
        let boundary = now() - window;
        let episodes = vec![
            episode("on-boundary", Some(boundary)),
            episode("just-older", Some(boundary - Duration::microseconds(1))),
        ];

        let feed = select_feed(enrich(episodes, &[], &[]), now(), window);

        let ids: Vec<_> = feed.iter().map(AnnotatedEpisode::id).collect();
        assert_eq!(ids, vec!["on-boundary"]);
    }

    #[test]
    fn resolved_episodes_are_never_included() {
        let episodes = vec![
            episode("future", Some(now() + Duration::days(1))),
            episode("today", Some(now())),
        ];
        let history = vec![listened("future"), listened("today")];
        let reviews = vec![review("future", 5), review("today", 1)];

        let feed = select_feed(
            enrich(episodes, &history, &reviews),
            now(),
            Duration::days(365),
        );
        assert!(feed.is_empty());
    }

    #[test]
    fn partially_done_episodes_stay() {
        let episodes = vec![
            episode("untouched", Some(now())),
            episode("listened", Some(now())),
            episode("rated-only", Some(now())),
        ];

        let feed = select_feed(
            enrich(episodes, &[listened("listened")], &[review("rated-only", 3)]),
            now(),
            default_recency_window(),
        );

        assert_eq!(feed.len(), 3);
        assert!(feed[1].listened && feed[1].rating.is_none());
        assert!(!feed[2].listened && feed[2].rating == Some(Rating::new(3).unwrap()));
    }

    #[test]
    fn missing_release_date_is_excluded() {
        let feed = select_feed(
            enrich(vec![episode("undated", None)], &[], &[]),
            now(),
            default_recency_window(),
        );
        assert!(feed.is_empty());
    }

    #[test]
    fn preserves_input_order() {
        let episodes = vec![
            episode("b", Some(now() - Duration::hours(1))),
            episode("a", Some(now() - Duration::hours(5))),
            episode("c", Some(now())),
        ];

        let feed = select_feed(enrich(episodes, &[], &[]), now(), default_recency_window());

        let ids: Vec<_> = feed.iter().map(AnnotatedEpisode::id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn listened_but_unrated_recent_episode_surfaces() {
        let episodes = vec![
            episode("e1", Some(now())),
            episode("e2", Some(now() - Duration::days(10))),
        ];

        let feed = select_feed(
            enrich(episodes, &[listened("e1")], &[]),
            now(),
            default_recency_window(),
        );

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].id(), "e1");
        assert!(feed[0].listened);
        assert!(feed[0].rating.is_none());
    }

    #[test]
    fn listened_and_rated_recent_episode_drops_out() {
        let feed = select_feed(
            enrich(
                vec![episode("e1", Some(now()))],
                &[listened("e1")],
                &[review("e1", 4)],
            ),
            now(),
            default_recency_window(),
        );

        assert!(feed.is_empty());
    }

    #[test]
    fn huge_window_does_not_overflow() {
        assert_eq!(
            recency_threshold(now(), Duration::MAX),
            DateTime::<Utc>::MIN_UTC
        );
    }
}
