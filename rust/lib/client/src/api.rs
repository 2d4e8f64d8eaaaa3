use crate::error::ApiError;
use crate::model::{Feed, FeedPost, Identity, ProfileView, SignupForm, ToggleAck, TokenGrant};

/// Session-level backend operations.
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync + 'static {
    /// Profile of the user the current token belongs to.
    async fn fetch_identity(&self) -> Result<Identity, ApiError>;

    /// Exchange `token` for a fresh access token.
    async fn refresh(&self, token: &str) -> Result<TokenGrant, ApiError>;

    async fn login(&self, username: &str, password: &str) -> Result<TokenGrant, ApiError>;

    async fn signup(&self, form: &SignupForm) -> Result<(), ApiError>;
}

/// Social graph reads and toggle mutations.
#[async_trait::async_trait]
pub trait SocialApi: Send + Sync + 'static {
    /// Flip the caller's like on `post_id`.
    async fn toggle_like(&self, post_id: &str) -> Result<ToggleAck, ApiError>;

    /// Flip the caller's follow of `username`.
    async fn toggle_follow(&self, username: &str) -> Result<ToggleAck, ApiError>;

    /// Publish a post. `image` is passed through as the backend expects it
    /// (a URL or an encoded image); the client never inspects it.
    async fn create_post(&self, image: &str, caption: &str) -> Result<FeedPost, ApiError>;

    async fn feed(&self) -> Result<Feed, ApiError>;

    async fn profile(&self, username: &str) -> Result<ProfileView, ApiError>;
}
