// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dates::deserialize_lenient;
use crate::error::RatingError;

/// A star rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Filled stars followed by empty ones, five in total
    pub fn stars(self) -> String {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX) - filled;
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's rating (and optional written review) of an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub episode_id: String,
    pub rating: Rating,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Episode name, joined in by the backend
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub show_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Request body for submitting a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub episode_id: String,
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

impl NewReview {
    /// Build a review, trimming the text and dropping it when blank
    pub fn new(episode_id: impl Into<String>, rating: Rating, review: Option<&str>) -> Self {
        let review = review
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(String::from);

        Self {
            episode_id: episode_id.into(),
            rating,
            review,
        }
    }
}
