// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::prelude::*;

use podlog::{
    AddShowStatus, AnnotatedEpisode, ApiClient, DEFAULT_API_URL, EpisodeQuery, EpisodeState,
    EpisodeUpdate, FeedController, FeedEvent, FeedObserver, FeedOptions, NoopObserver,
    ReqwestClient, ReviewRecord, SharedFeedObserver, Show, fetch_annotated, search_episodes,
};

// Emoji with fallback for terminals without Unicode support
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static STAR: Emoji<'_, '_> = Emoji("⭐ ", "[*] ");
static CHART: Emoji<'_, '_> = Emoji("📊 ", "");

/// Keep track of the podcast episodes you listen to and rate
#[derive(Parser, Debug)]
#[command(name = "podlog")]
#[command(about = "Keep track of the podcast episodes you listen to and rate")]
#[command(version)]
struct Args {
    /// Base URL of the podcast backend
    #[arg(long, env = "PODLOG_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Quiet mode - suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show recent episodes that still need listening or rating (default)
    Feed(FeedArgs),

    /// List episodes with their listened and rating state
    Episodes {
        /// Only episodes of this show
        #[arg(long)]
        show: Option<String>,

        /// Maximum number of episodes
        #[arg(short, long)]
        limit: Option<usize>,

        /// Case-insensitive filter on name and description
        #[arg(long)]
        search: Option<String>,
    },

    /// Mark an episode as listened
    Listen {
        episode_id: String,

        #[command(flatten)]
        feed: FeedArgs,
    },

    /// Rate an episode from 1 to 5 stars
    Review {
        episode_id: String,

        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,

        /// Written review
        #[arg(short = 'm', long)]
        text: Option<String>,

        #[command(flatten)]
        feed: FeedArgs,
    },

    /// Show the latest reviews
    Reviews {
        /// Maximum number of reviews
        #[arg(short, long)]
        limit: Option<usize>,

        /// Search review texts and episode names instead
        #[arg(long)]
        search: Option<String>,
    },

    /// List the shows in your library
    Shows,

    /// Search the catalog for shows to add
    Search { query: String },

    /// Add a show and import its episodes
    AddShow { show_id: String },

    /// Re-import the episodes of a show
    RefreshShow { show_id: String },

    /// Show listening statistics
    Stats,
}

#[derive(clap::Args, Debug, Clone)]
struct FeedArgs {
    /// Days back an episode may have been released to appear in the feed
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u32).range(1..))]
    recency_days: u32,

    /// Number of latest episodes to consider
    #[arg(long, default_value = "50")]
    episode_limit: usize,
}

impl Default for Command {
    fn default() -> Self {
        Command::Feed(FeedArgs::default())
    }
}

impl Default for FeedArgs {
    fn default() -> Self {
        Self {
            recency_days: 2,
            episode_limit: 50,
        }
    }
}

impl FeedArgs {
    fn options(&self, quiet: bool) -> FeedOptions {
        let mut options = FeedOptions {
            recency_window: chrono::Duration::days(i64::from(self.recency_days)),
            episode_limit: self.episode_limit,
            ..Default::default()
        };
        // The minimum refresh time only exists for the spinner
        if quiet {
            options.min_refresh_duration = std::time::Duration::ZERO;
        }
        options
    }
}

/// Feed observer printing to the terminal with a spinner during refreshes
struct TerminalObserver {
    spinner: ProgressBar,
}

impl TerminalObserver {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}") {
            spinner.set_style(style);
        }
        Self { spinner }
    }
}

impl FeedObserver for TerminalObserver {
    fn notify(&self, event: FeedEvent) {
        match event {
            FeedEvent::RefreshStarted => {
                self.spinner.reset();
                self.spinner
                    .enable_steady_tick(std::time::Duration::from_millis(100));
                self.spinner
                    .set_message(format!("{SEARCH}Refreshing new episodes..."));
            }

            FeedEvent::RefreshSkipped => {
                self.spinner.set_message("Refresh already running");
            }

            FeedEvent::RefreshCompleted { fetched, feed_size } => {
                self.spinner.finish_and_clear();
                println!(
                    "{HEADPHONES}{} checked, {} waiting for you",
                    fetched.to_string().cyan(),
                    feed_size.to_string().yellow().bold()
                );
            }

            FeedEvent::RefreshFailed { error } => {
                self.spinner
                    .abandon_with_message(format!("{FAILURE}{}", error.red()));
            }

            FeedEvent::EpisodeListened { episode_id } => {
                println!("{SUCCESS}Marked {} as listened", episode_id.green());
            }

            FeedEvent::EpisodeRated { episode_id, rating } => {
                println!(
                    "{STAR}Rated {} {}",
                    episode_id.green(),
                    rating.stars().yellow()
                );
            }

            FeedEvent::EpisodeResolved { episode_id } => {
                println!("{PARTY}{} is done and left your feed", episode_id.bold());
            }

            FeedEvent::EpisodeUpdateFailed { episode_id, error } => {
                eprintln!("{FAILURE}{} - {}", episode_id.yellow(), error.red());
            }
        }
    }
}

fn print_episode(annotated: &AnnotatedEpisode) {
    let episode = &annotated.episode;
    let status = match annotated.state() {
        EpisodeState::Unlistened => "listen".blue().bold(),
        EpisodeState::ListenedUnrated => "rate".green().bold(),
        EpisodeState::ListenedRated => "done".dimmed(),
    };
    let released = episode
        .release_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string());

    println!("  [{}] {}", status, episode.name.bold());
    print!(
        "         {} • {} • {}",
        episode.show_name.dimmed(),
        released,
        episode.formatted_duration()
    );
    if let Some(rating) = annotated.rating {
        print!(" • {}", rating.stars().yellow());
    }
    println!("\n         {}", episode.id.dimmed());
}

fn print_feed(episodes: &[AnnotatedEpisode]) {
    if episodes.is_empty() {
        println!("\n{PARTY}No new episodes to catch up on!");
        return;
    }

    println!("\n{}", "New Episodes".bold().magenta());
    for episode in episodes {
        print_episode(episode);
    }
}

fn print_review(review: &ReviewRecord) {
    let name = review.name.as_deref().unwrap_or(&review.episode_id);
    println!("  {} {}", review.rating.stars().yellow(), name.bold());
    if let Some(show_name) = &review.show_name {
        println!("    {}", show_name.dimmed());
    }
    if let Some(text) = review.review.as_deref().filter(|t| !t.is_empty()) {
        println!("    \"{}\"", text);
    }
}

fn print_show(show: &Show) {
    let publisher = show.publisher.as_deref().unwrap_or("unknown publisher");
    let count = show
        .total_episodes
        .map(|n| format!(" • {n} episodes"))
        .unwrap_or_default();
    println!(
        "  {} {}{}\n    {}",
        show.name.bold(),
        publisher.dimmed(),
        count,
        show.id.dimmed()
    );
}

/// Run a mutation against a freshly loaded feed so its effect on the feed
/// can be reported
async fn load_feed(controller: &FeedController<ReqwestClient>) {
    if let Err(e) = controller.refresh().await {
        tracing::warn!(error = %e, "could not load feed before updating episode");
    }
}

fn report_update(update: &EpisodeUpdate, controller: &FeedController<ReqwestClient>, quiet: bool) {
    if quiet {
        return;
    }
    match update {
        EpisodeUpdate::Updated(episode) if episode.state() == EpisodeState::ListenedUnrated => {
            println!("  Still in your feed, waiting for a rating");
        }
        EpisodeUpdate::Updated(_) => println!("  Still in your feed"),
        EpisodeUpdate::Resolved(_) | EpisodeUpdate::NotInFeed => {}
    }
    println!(
        "  {} episodes left in your feed",
        controller.episodes().len().to_string().yellow()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let quiet = args.quiet;

    let api = ApiClient::new(ReqwestClient::new(), &args.api_url)
        .with_context(|| format!("Invalid API URL '{}'", args.api_url))?;

    let observer: SharedFeedObserver = if quiet {
        NoopObserver::shared()
    } else {
        Arc::new(TerminalObserver::new())
    };

    match args.command.unwrap_or_default() {
        Command::Feed(feed) => {
            let controller = FeedController::new(api, feed.options(quiet), observer);
            controller
                .refresh()
                .await
                .context("Failed to refresh the episode feed")?;
            print_feed(&controller.episodes());
        }

        Command::Episodes {
            show,
            limit,
            search,
        } => {
            let query = EpisodeQuery {
                show_id: show,
                limit,
                offset: None,
            };
            let episodes = fetch_annotated(&api, &query)
                .await
                .context("Failed to load episodes")?;
            let matches = search_episodes(&episodes, search.as_deref().unwrap_or_default());

            println!("\n{}", "Podcast Episodes".bold().magenta());
            for episode in matches {
                print_episode(episode);
            }
        }

        Command::Listen { episode_id, feed } => {
            let controller = FeedController::new(api, feed.options(true), observer);
            load_feed(&controller).await;
            let update = controller
                .mark_listened(&episode_id)
                .await
                .with_context(|| format!("Failed to mark {episode_id} as listened"))?;
            report_update(&update, &controller, quiet);
        }

        Command::Review {
            episode_id,
            rating,
            text,
            feed,
        } => {
            let controller = FeedController::new(api, feed.options(true), observer);
            load_feed(&controller).await;
            let update = controller
                .submit_review(&episode_id, rating, text.as_deref())
                .await
                .with_context(|| format!("Failed to review {episode_id}"))?;
            report_update(&update, &controller, quiet);
        }

        Command::Reviews { limit, search } => {
            let reviews = match search {
                Some(query) => api.search_reviews(&query).await,
                None => api.list_reviews(limit).await,
            }
            .context("Failed to load reviews")?;

            println!("\n{}", "Recent Reviews".bold().magenta());
            for review in &reviews {
                print_review(review);
            }
        }

        Command::Shows => {
            let shows = api.list_shows().await.context("Failed to load shows")?;
            println!("\n{}", "Your Shows".bold().magenta());
            for show in &shows {
                print_show(show);
            }
        }

        Command::Search { query } => {
            let shows = api
                .search_shows(&query)
                .await
                .context("Failed to search shows")?;
            println!("\n{SEARCH}{}", format!("Results for '{query}'").bold());
            for show in &shows {
                print_show(show);
            }
        }

        Command::AddShow { show_id } => {
            let response = api
                .add_show(&show_id)
                .await
                .with_context(|| format!("Failed to add show {show_id}"))?;
            let name = response
                .show
                .as_ref()
                .map(|show| show.name.clone())
                .unwrap_or_else(|| show_id.clone());
            match response.status {
                AddShowStatus::Success => println!(
                    "{SUCCESS}Added {} with {} episodes",
                    name.bold(),
                    response.episodes_count.unwrap_or(0).to_string().cyan()
                ),
                AddShowStatus::Exists => {
                    println!("{HEADPHONES}{} is already in your library", name.bold())
                }
            }
        }

        Command::RefreshShow { show_id } => {
            let response = api
                .refresh_show(&show_id)
                .await
                .with_context(|| format!("Failed to refresh show {show_id}"))?;
            println!(
                "{SUCCESS}Imported {} episodes for {}",
                response.episodes_count.to_string().cyan(),
                show_id.bold()
            );
        }

        Command::Stats => {
            let stats = api.stats().await.context("Failed to load statistics")?;
            println!(
                "\n{CHART}{} episodes from {} shows",
                stats.total_episodes.to_string().cyan().bold(),
                stats.total_shows.to_string().cyan().bold()
            );
            for month in &stats.monthly_stats {
                println!(
                    "  {}  {} {}",
                    month.month,
                    "█".repeat(month.count.min(40) as usize).green(),
                    month.count
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn feed_args(argv: &[&str]) -> FeedArgs {
        match Args::try_parse_from(argv).unwrap().command.unwrap_or_default() {
            Command::Feed(feed) => feed,
            other => panic!("expected feed command, got {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_subcommand_runs_the_default_feed() {
        let feed = feed_args(&["podlog"]);
        assert_eq!(feed.recency_days, 2);
        assert_eq!(feed.episode_limit, 50);
    }

    #[test]
    fn feed_subcommand_defaults_match_the_fallback() {
        let parsed = feed_args(&["podlog", "feed"]);
        let fallback = FeedArgs::default();
        assert_eq!(parsed.recency_days, fallback.recency_days);
        assert_eq!(parsed.episode_limit, fallback.episode_limit);
    }

    #[test]
    fn recency_days_builds_the_window() {
        let feed = feed_args(&["podlog", "feed", "--recency-days", "7"]);
        let options = feed.options(false);
        assert_eq!(options.recency_window, chrono::Duration::days(7));
        assert_eq!(options.min_refresh_duration, FeedOptions::default().min_refresh_duration);
    }

    #[test]
    fn largest_recency_days_does_not_overflow() {
        let max = u32::MAX.to_string();
        let feed = feed_args(&["podlog", "feed", "--recency-days", max.as_str()]);
        let options = feed.options(true);
        assert_eq!(options.recency_window, chrono::Duration::days(i64::from(u32::MAX)));
        assert_eq!(options.min_refresh_duration, std::time::Duration::ZERO);
    }

    #[test]
    fn out_of_range_recency_days_are_rejected() {
        for value in ["200000000000000", "-3", "0"] {
            let result = Args::try_parse_from(["podlog", "feed", "--recency-days", value]);
            assert!(result.is_err(), "--recency-days {value} should be rejected");
        }
        assert!(Args::try_parse_from(["podlog", "feed", "--recency-days=-3"]).is_err());
    }

    #[test]
    fn review_rating_must_be_one_to_five() {
        assert!(Args::try_parse_from(["podlog", "review", "e1", "6"]).is_err());
        assert!(Args::try_parse_from(["podlog", "review", "e1", "0"]).is_err());

        let args = Args::try_parse_from(["podlog", "review", "e1", "4", "-m", "great"]).unwrap();
        match args.command {
            Some(Command::Review {
                episode_id,
                rating,
                text,
                ..
            }) => {
                assert_eq!(episode_id, "e1");
                assert_eq!(rating, 4);
                assert_eq!(text.as_deref(), Some("great"));
            }
            other => panic!("expected review command, got {other:?}"),
        }
    }

    #[test]
    fn api_url_is_bound_to_env_and_global() {
        let command = Args::command();
        let api_url = command
            .get_arguments()
            .find(|arg| arg.get_id() == "api_url")
            .unwrap();
        assert_eq!(api_url.get_env(), Some(std::ffi::OsStr::new("PODLOG_API_URL")));
        assert!(api_url.is_global_set());

        let args =
            Args::try_parse_from(["podlog", "stats", "--api-url", "http://backend:9000"]).unwrap();
        assert_eq!(args.api_url, "http://backend:9000");
        assert!(matches!(args.command, Some(Command::Stats)));
    }
}
