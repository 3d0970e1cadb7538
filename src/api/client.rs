// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpClient, HttpResponse};
use crate::models::{
    AddShowRequest, AddShowResponse, Episode, ListenRequest, ListeningHistoryRecord, NewReview,
    RefreshShowResponse, ReviewRecord, Show, Stats,
};

/// Default location of the podcast backend
pub const DEFAULT_API_URL: &str = "http://localhost:5328";

/// Message used when a failed response carries no readable error
const GENERIC_ERROR: &str = "An error occurred";

/// Filters for listing episodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeQuery {
    /// Restrict to one show
    pub show_id: Option<String>,
    /// Maximum number of episodes, newest first
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl EpisodeQuery {
    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn for_show(show_id: impl Into<String>) -> Self {
        Self {
            show_id: Some(show_id.into()),
            ..Default::default()
        }
    }
}

/// Typed client for the podcast REST backend
#[derive(Clone)]
pub struct ApiClient<C> {
    client: C,
    base_url: Url,
}

impl<C: HttpClient> ApiClient<C> {
    /// Create a client for the backend at `base_url`
    pub fn new(client: C, base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        // Keep any path prefix when appending endpoint segments
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/episodes`
    pub async fn list_episodes(&self, query: &EpisodeQuery) -> Result<Vec<Episode>, ApiError> {
        let mut url = self.endpoint(&["api", "episodes"]);
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(show_id) = &query.show_id {
                pairs.append_pair("show_id", show_id);
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = query.offset {
                pairs.append_pair("offset", &offset.to_string());
            }
        }
        clear_empty_query(&mut url);

        self.get_json(url).await
    }

    /// `GET /api/episodes/{id}`
    pub async fn get_episode(&self, episode_id: &str) -> Result<Episode, ApiError> {
        self.get_json(self.endpoint(&["api", "episodes", episode_id]))
            .await
    }

    /// `GET /api/listening-history`
    pub async fn listening_history(&self) -> Result<Vec<ListeningHistoryRecord>, ApiError> {
        self.get_json(self.endpoint(&["api", "listening-history"]))
            .await
    }

    /// `POST /api/listening-history`
    pub async fn mark_listened(&self, episode_id: &str) -> Result<(), ApiError> {
        let body = ListenRequest {
            episode_id: episode_id.to_string(),
        };
        self.post(self.endpoint(&["api", "listening-history"]), &body)
            .await
            .map(|_| ())
    }

    /// `GET /api/reviews`, newest first
    pub async fn list_reviews(&self, limit: Option<usize>) -> Result<Vec<ReviewRecord>, ApiError> {
        let mut url = self.endpoint(&["api", "reviews"]);
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }

        self.get_json(url).await
    }

    /// `GET /api/reviews/search?q=`
    pub async fn search_reviews(&self, query: &str) -> Result<Vec<ReviewRecord>, ApiError> {
        let query = non_empty_query(query)?;
        let mut url = self.endpoint(&["api", "reviews", "search"]);
        url.query_pairs_mut().append_pair("q", query);

        self.get_json(url).await
    }

    /// `POST /api/reviews`
    pub async fn submit_review(&self, review: &NewReview) -> Result<(), ApiError> {
        self.post(self.endpoint(&["api", "reviews"]), review)
            .await
            .map(|_| ())
    }

    /// `GET /api/shows`
    pub async fn list_shows(&self) -> Result<Vec<Show>, ApiError> {
        self.get_json(self.endpoint(&["api", "shows"])).await
    }

    /// `GET /api/shows/search?q=`
    pub async fn search_shows(&self, query: &str) -> Result<Vec<Show>, ApiError> {
        let query = non_empty_query(query)?;
        let mut url = self.endpoint(&["api", "shows", "search"]);
        url.query_pairs_mut().append_pair("q", query);

        self.get_json(url).await
    }

    /// `POST /api/shows`
    pub async fn add_show(&self, show_id: &str) -> Result<AddShowResponse, ApiError> {
        let url = self.endpoint(&["api", "shows"]);
        let body = AddShowRequest {
            show_id: show_id.to_string(),
        };
        let response = self.post(url.clone(), &body).await?;
        decode(&url, &response)
    }

    /// `POST /api/shows/{id}/refresh`
    pub async fn refresh_show(&self, show_id: &str) -> Result<RefreshShowResponse, ApiError> {
        let url = self.endpoint(&["api", "shows", show_id, "refresh"]);
        let response = self.post(url.clone(), &serde_json::json!({})).await?;
        decode(&url, &response)
    }

    /// `GET /api/stats`
    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get_json(self.endpoint(&["api", "stats"])).await
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked for cannot-be-a-base in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(&url)
            .await
            .map_err(|e| ApiError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        debug!(%url, status = response.status, "GET");
        check_status(&url, &response)?;
        decode(&url, &response)
    }

    async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<HttpResponse, ApiError> {
        let body = serde_json::to_vec(body)?;
        let response = self
            .client
            .post_json(&url, body)
            .await
            .map_err(|e| ApiError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        debug!(%url, status = response.status, "POST");
        check_status(&url, &response)?;
        Ok(response)
    }
}

fn check_status(url: &Url, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }

    let message = error_message(response);
    warn!(%url, status = response.status, %message, "request rejected");
    Err(ApiError::HttpStatus {
        url: url.to_string(),
        status: response.status,
        message,
    })
}

/// Pull a human readable message out of an error body
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_slice::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(String::from))
        })
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}

fn decode<T: DeserializeOwned>(url: &Url, response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::DecodeFailed {
        url: url.to_string(),
        source: e,
    })
}

fn non_empty_query(query: &str) -> Result<&str, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        Err(ApiError::EmptyQuery)
    } else {
        Ok(query)
    }
}

fn clear_empty_query(url: &mut Url) {
    if url.query() == Some("") {
        url.set_query(None);
    }
}
