//! App lifecycle requests.

use flux_derive::request;

/// App started on `current_url`. Resets state and runs the session guard.
#[request("app/initialize")]
pub struct InitializeReq {
    pub current_url: String,
}

/// Load the home feed and follow suggestions.
#[request("feed/load")]
pub struct FeedLoadReq;
