use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::api::{SessionApi, SocialApi};
use crate::error::ApiError;
use crate::graphql::GraphqlClient;
use crate::model::{
    Author, Feed, FeedPost, Identity, ProfilePost, ProfileSummary, ProfileView, SignupForm,
    ToggleAck, TokenGrant,
};
use crate::token::TokenSource;

const MY_PROFILE: &str = r#"
query getMyProfile {
  myProfile {
    id
    user { id username firstName lastName }
    profileimg
  }
}"#;

const REFRESH_TOKEN: &str = r#"
mutation RefreshToken($token: String!) {
  refreshToken(token: $token) { token payload }
}"#;

const TOKEN_AUTH: &str = r#"
mutation TokenAuth($username: String!, $password: String!) {
  tokenAuth(username: $username, password: $password) { token }
}"#;

const LIKE_POST: &str = r#"
mutation LikePost($postId: UUID!) {
  likePost(postId: $postId) {
    liked
    likes { user { username } }
    message
  }
}"#;

const FOLLOW_USER: &str = r#"
mutation FollowUser($username: String!) {
  followUser(username: $username) { followed message }
}"#;

const CREATE_POST: &str = r#"
mutation CreatePost($image: String!, $caption: String!) {
  createPost(image: $image, caption: $caption) {
    post {
      id
      image
      caption
      createdAt
      user { id username firstName lastName profile { profileimg } }
    }
  }
}"#;

const FEED: &str = r#"
query GetFeedData {
  feed {
    id
    user { id username firstName lastName profile { profileimg } }
    image
    caption
    createdAt
    likes { user { username } }
  }
  suggestions {
    id
    user { id username firstName lastName }
    bio
    profileimg
    followersCount
    followingCount
    isFollowing
  }
}"#;

const PROFILE: &str = r#"
query getProfile($username: String!) {
  profile(username: $username) {
    id
    bio
    location
    followersCount
    followingCount
    isFollowing
    profileimg
    user {
      id
      username
      firstName
      lastName
      dateJoined
      posts { id image caption createdAt likes { user { username } } }
    }
  }
}"#;

/// Message the backend returns, with a non-error payload, for unknown posts.
const POST_NOT_FOUND: &str = "Post not found.";

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    #[serde(default)]
    id: Option<String>,
    username: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    profile: Option<WireAvatar>,
    #[serde(default)]
    date_joined: Option<String>,
    #[serde(default)]
    posts: Vec<WirePost>,
}

impl WireUser {
    fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        let full = format!("{} {}", first, last);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Deserialize)]
struct WireAvatar {
    profileimg: Option<String>,
}

#[derive(Deserialize)]
struct WireLike {
    user: WireLiker,
}

#[derive(Deserialize)]
struct WireLiker {
    username: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePost {
    id: String,
    #[serde(default)]
    user: Option<WireUser>,
    image: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    created_at: String,
    #[serde(default)]
    likes: Vec<WireLike>,
}

fn likers(likes: Vec<WireLike>) -> Vec<String> {
    likes.into_iter().map(|l| l.user.username).collect()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProfile {
    #[serde(default)]
    id: Option<String>,
    user: WireUser,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    profileimg: Option<String>,
    #[serde(default)]
    followers_count: Option<u32>,
    #[serde(default)]
    following_count: Option<u32>,
    #[serde(default)]
    is_following: Option<bool>,
}

impl WireProfile {
    fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self
                .user
                .id
                .clone()
                .or_else(|| self.id.clone())
                .unwrap_or_default(),
            username: self.user.username.clone(),
            display_name: self.user.display_name(),
            avatar: self.profileimg.clone(),
            bio: self.bio.clone(),
            followers_count: self.followers_count.unwrap_or(0),
            following_count: self.following_count.unwrap_or(0),
            is_following: self.is_following.unwrap_or(false),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyProfileData {
    my_profile: Option<WireProfile>,
}

/// The backend issues short-lived tokens refreshed in place, so
/// `refreshToken` is usually absent from these payloads.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTokens {
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl From<WireTokens> for TokenGrant {
    fn from(w: WireTokens) -> Self {
        TokenGrant { token: w.token, refresh_token: w.refresh_token }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshData {
    refresh_token: Option<WireTokens>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAuthData {
    token_auth: Option<WireTokens>,
}

#[derive(Deserialize)]
struct WireLikeAck {
    liked: Option<bool>,
    likes: Option<Vec<WireLike>>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikePostData {
    like_post: Option<WireLikeAck>,
}

#[derive(Deserialize)]
struct WireFollowAck {
    followed: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FollowUserData {
    follow_user: Option<WireFollowAck>,
}

#[derive(Deserialize)]
struct WireCreatedPost {
    post: Option<WirePost>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostData {
    create_post: Option<WireCreatedPost>,
}

#[derive(Deserialize)]
struct FeedData {
    #[serde(default)]
    feed: Option<Vec<WirePost>>,
    #[serde(default)]
    suggestions: Option<Vec<WireProfile>>,
}

#[derive(Deserialize)]
struct ProfileData {
    profile: Option<WireProfile>,
}

#[derive(Deserialize)]
struct CreateUserError {
    #[serde(default)]
    message: Vec<String>,
}

// ── HttpApi ─────────────────────────────────────────────────────────

/// `SessionApi` + `SocialApi` over the backend's HTTP endpoints:
/// `{base_url}/graphql` and `{base_url}/create-user`.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    graphql: GraphqlClient,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, token_source: Arc<dyn TokenSource>) -> Self {
        let http = reqwest::Client::new();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let graphql = GraphqlClient::new(http.clone(), format!("{}/graphql", base_url), token_source);
        Self { http, base_url, graphql }
    }

    /// Override the Authorization scheme (default `JWT`).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.graphql = self.graphql.with_scheme(scheme);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl SessionApi for HttpApi {
    async fn fetch_identity(&self) -> Result<Identity, ApiError> {
        let data: MyProfileData = self.graphql.execute(MY_PROFILE, json!({})).await?;
        let profile = data
            .my_profile
            .ok_or_else(|| ApiError::Auth("no profile for the current token".into()))?;
        Ok(Identity {
            id: profile
                .user
                .id
                .clone()
                .or_else(|| profile.id.clone())
                .unwrap_or_default(),
            username: profile.user.username.clone(),
            display_name: profile.user.display_name(),
            avatar: profile.profileimg,
        })
    }

    async fn refresh(&self, token: &str) -> Result<TokenGrant, ApiError> {
        let data: RefreshData = self
            .graphql
            .execute_anonymous(REFRESH_TOKEN, json!({ "token": token }))
            .await?;
        data.refresh_token
            .map(TokenGrant::from)
            .ok_or_else(|| ApiError::Auth("refresh returned no token".into()))
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenGrant, ApiError> {
        let data: TokenAuthData = self
            .graphql
            .execute_anonymous(
                TOKEN_AUTH,
                json!({ "username": username, "password": password }),
            )
            .await?;
        data.token_auth
            .map(TokenGrant::from)
            .ok_or_else(|| ApiError::Auth("login returned no token".into()))
    }

    async fn signup(&self, form: &SignupForm) -> Result<(), ApiError> {
        let url = format!("{}/create-user", self.base_url);
        let resp = self.http.post(&url).json(form).send().await?;
        let status = resp.status().as_u16();
        if status == 201 {
            debug!(username = %form.username, "account created");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<CreateUserError>(&body)
            .ok()
            .and_then(|e| e.message.into_iter().next())
            .unwrap_or(body);
        Err(ApiError::Server { status, message })
    }
}

#[async_trait::async_trait]
impl SocialApi for HttpApi {
    async fn toggle_like(&self, post_id: &str) -> Result<ToggleAck, ApiError> {
        let data: LikePostData = self
            .graphql
            .execute(LIKE_POST, json!({ "postId": post_id }))
            .await?;
        let ack = data
            .like_post
            .ok_or_else(|| ApiError::Decode("likePost returned null".into()))?;
        if ack.message.as_deref() == Some(POST_NOT_FOUND) {
            return Err(ApiError::GraphQL(vec![POST_NOT_FOUND.to_string()]));
        }
        let active = ack
            .liked
            .ok_or_else(|| ApiError::Decode("likePost.liked missing".into()))?;
        let count = ack
            .likes
            .map(|likes| u32::try_from(likes.len()).unwrap_or(u32::MAX));
        Ok(ToggleAck { active, count })
    }

    async fn toggle_follow(&self, username: &str) -> Result<ToggleAck, ApiError> {
        let data: FollowUserData = self
            .graphql
            .execute(FOLLOW_USER, json!({ "username": username }))
            .await?;
        let active = data
            .follow_user
            .and_then(|ack| ack.followed)
            .ok_or_else(|| ApiError::Decode("followUser.followed missing".into()))?;
        Ok(ToggleAck { active, count: None })
    }

    async fn create_post(&self, image: &str, caption: &str) -> Result<FeedPost, ApiError> {
        let data: CreatePostData = self
            .graphql
            .execute(CREATE_POST, json!({ "image": image, "caption": caption }))
            .await?;
        let post = data
            .create_post
            .and_then(|c| c.post)
            .ok_or_else(|| ApiError::Decode("createPost returned no post".into()))?;
        debug!(post_id = %post.id, "post created");
        Ok(feed_post(post))
    }

    async fn feed(&self) -> Result<Feed, ApiError> {
        let data: FeedData = self.graphql.execute(FEED, json!({})).await?;
        let posts = data
            .feed
            .unwrap_or_default()
            .into_iter()
            .map(feed_post)
            .collect();
        let suggestions = data
            .suggestions
            .unwrap_or_default()
            .iter()
            .map(WireProfile::summary)
            .collect();
        Ok(Feed { posts, suggestions })
    }

    async fn profile(&self, username: &str) -> Result<ProfileView, ApiError> {
        let data: ProfileData = self
            .graphql
            .execute(PROFILE, json!({ "username": username }))
            .await?;
        let profile = data.profile.ok_or_else(|| ApiError::Server {
            status: 404,
            message: format!("user '{}' not found", username),
        })?;
        let summary = profile.summary();
        let WireProfile { location, user, .. } = profile;
        let posts = user
            .posts
            .into_iter()
            .map(|p| ProfilePost {
                id: p.id,
                image: p.image,
                caption: p.caption.unwrap_or_default(),
                created_at: p.created_at,
                likers: likers(p.likes),
            })
            .collect();
        Ok(ProfileView {
            summary,
            location,
            date_joined: user.date_joined,
            posts,
        })
    }
}

fn feed_post(p: WirePost) -> FeedPost {
    let author = match p.user {
        Some(u) => Author {
            id: u.id.clone().unwrap_or_default(),
            display_name: u.display_name(),
            avatar: u.profile.as_ref().and_then(|a| a.profileimg.clone()),
            username: u.username,
        },
        None => Author {
            id: String::new(),
            username: String::new(),
            display_name: String::new(),
            avatar: None,
        },
    };
    FeedPost {
        id: p.id,
        author,
        image: p.image,
        caption: p.caption.unwrap_or_default(),
        created_at: p.created_at,
        likers: likers(p.likes),
    }
}
