// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dates::deserialize_lenient;

/// Records that the user listened to an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListeningHistoryRecord {
    pub episode_id: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub listened_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub episode_name: Option<String>,
    #[serde(default)]
    pub show_name: Option<String>,
}

/// Request body for marking an episode as listened
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenRequest {
    pub episode_id: String,
}
