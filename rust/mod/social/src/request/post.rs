//! Post requests.

use flux_derive::request;

/// Like the post if not liked, unlike it otherwise.
#[request("post/toggle-like")]
pub struct ToggleLikeReq {
    pub post_id: String,
}

/// Publish a post. `image` is opaque to the client.
#[request("post/create")]
pub struct CreatePostReq {
    pub image: String,
    pub caption: String,
}
