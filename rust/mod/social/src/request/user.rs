//! User requests.

use flux_derive::request;

/// Follow the user if not followed, unfollow otherwise.
#[request("user/toggle-follow")]
pub struct ToggleFollowReq {
    pub username: String,
}

#[request("profile/load")]
pub struct LoadProfileReq {
    pub username: String,
}
