// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

use super::episode::Image;

/// A podcast show in the user's library or in search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub total_episodes: Option<u32>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Listening statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_episodes: u64,
    pub total_shows: u64,
    #[serde(default)]
    pub monthly_stats: Vec<MonthlyCount>,
}

/// Number of episodes listened to in a month (`YYYY-MM`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AddShowRequest {
    pub show_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddShowStatus {
    /// The show was imported together with its episodes
    Success,
    /// The show was already in the library
    Exists,
}

/// Response to adding a show to the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddShowResponse {
    pub status: AddShowStatus,
    #[serde(default)]
    pub show: Option<Show>,
    #[serde(default)]
    pub episodes_count: Option<u32>,
}

/// Response to re-importing a show's episodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshShowResponse {
    pub status: String,
    #[serde(default)]
    pub episodes_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_show_response_distinguishes_existing() {
        let json = r#"{"status": "exists", "show": {"id": "s1", "name": "The Show", "publisher": "Pub", "total_episodes": 12, "images": []}}"#;
        let response: AddShowResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.status, AddShowStatus::Exists);
        assert_eq!(response.show.unwrap().total_episodes, Some(12));
        assert!(response.episodes_count.is_none());
    }

    #[test]
    fn stats_deserialize_monthly_counts() {
        let json = r#"{
            "total_episodes": 40,
            "total_shows": 3,
            "monthly_stats": [{"month": "2024-03", "count": 11}, {"month": "2024-02", "count": 29}]
        }"#;
        let stats: Stats = serde_json::from_str(json).unwrap();

        assert_eq!(stats.total_episodes, 40);
        assert_eq!(stats.monthly_stats.len(), 2);
        assert_eq!(stats.monthly_stats[0].month, "2024-03");
    }
}
