// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dates::deserialize_lenient;

/// Artwork attached to a show or episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// A single podcast episode as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub show_name: String,
    #[serde(default)]
    pub show_id: Option<String>,
    /// Missing or unparseable dates are kept as `None`
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    /// Flat thumbnail URL stored by the backend when no image list is present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Episode {
    /// Preferred thumbnail: the first listed image, else the flat image URL
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.images
            .first()
            .map(|image| image.url.as_str())
            .or(self.image_url.as_deref())
    }

    /// Human readable duration, e.g. `1h 5m` or `42m`
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_ms)
    }
}

/// Format a millisecond duration as hours and minutes
pub fn format_duration(duration_ms: u64) -> String {
    let minutes = duration_ms / 60_000;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}
