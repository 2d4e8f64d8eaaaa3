//! Home feed, stored at `feed/state`.

use flux_derive::state;
use serde::{Deserialize, Serialize};
use socialbook_client::{FeedPost, ProfileSummary};

/// Posts of followed users (newest first) and follow suggestions.
///
/// Like and follow flags are not kept here; they live in the relation
/// entries seeded from this data.
#[state("feed/state")]
#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    pub posts: Vec<FeedPost>,
    pub suggestions: Vec<ProfileSummary>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FeedState {
    pub fn loading(previous: Option<FeedState>) -> Self {
        FeedState { loading: true, error: None, ..previous.unwrap_or_default() }
    }
}
