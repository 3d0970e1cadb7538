// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod dates;
mod episode;
mod history;
mod review;
mod show;

pub use dates::parse_lenient_datetime;
pub use episode::{Episode, Image, format_duration};
pub use history::{ListenRequest, ListeningHistoryRecord};
pub use review::{NewReview, Rating, ReviewRecord};
pub(crate) use show::AddShowRequest;
pub use show::{AddShowResponse, AddShowStatus, MonthlyCount, RefreshShowResponse, Show, Stats};
