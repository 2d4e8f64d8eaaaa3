//! In-memory fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use socialbook_client::{
    ApiError, Author, Feed, FeedPost, Identity, ProfileView, SessionApi, SignupForm, SocialApi,
    ToggleAck, TokenGrant,
};
use socialbook_flux::StateStore;
use socialbook_kv::{KVError, KVStore, MemoryStore};
use tokio::sync::Notify;

use crate::config::SessionConfig;
use crate::credential::CredentialStore;
use crate::navigator::{Navigator, StateNavigator};
use crate::notifier::NoticeBoard;

pub fn identity() -> Identity {
    Identity {
        id: "42".into(),
        username: "alice".into(),
        display_name: "Alice Liddell".into(),
        avatar: None,
    }
}

fn expired() -> ApiError {
    ApiError::GraphQL(vec!["Signature has expired".into()])
}

/// Session backend that accepts a fixed set of tokens.
#[derive(Default)]
pub struct FakeSessionApi {
    credentials: OnceLock<CredentialStore>,
    accepted: Vec<String>,
    refreshes: HashMap<String, String>,
    logins: HashMap<(String, String), String>,
    signup_error: Option<String>,
    identity_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    login_calls: AtomicUsize,
    signup_calls: AtomicUsize,
    refreshed_with: Mutex<Vec<String>>,
}

impl FakeSessionApi {
    /// `fetch_identity` succeeds while `token` is the stored access token.
    pub fn accepting(mut self, token: &str) -> Self {
        self.accepted.push(token.into());
        self
    }

    /// `refresh(from)` returns `to`.
    pub fn refreshing(mut self, from: &str, to: &str) -> Self {
        self.refreshes.insert(from.into(), to.into());
        self
    }

    pub fn with_login(mut self, username: &str, password: &str, token: &str) -> Self {
        self.logins
            .insert((username.into(), password.into()), token.into());
        self
    }

    pub fn failing_signup(mut self, message: &str) -> Self {
        self.signup_error = Some(message.into());
        self
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn signup_calls(&self) -> usize {
        self.signup_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.identity_calls() + self.refresh_calls() + self.login_calls() + self.signup_calls()
    }

    pub fn refreshed_with(&self) -> Vec<String> {
        self.refreshed_with.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SessionApi for FakeSessionApi {
    async fn fetch_identity(&self) -> Result<Identity, ApiError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        let token = self
            .credentials
            .get()
            .and_then(|c| c.access_token().unwrap());
        match token {
            Some(t) if self.accepted.contains(&t) => Ok(identity()),
            _ => Err(expired()),
        }
    }

    async fn refresh(&self, token: &str) -> Result<TokenGrant, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refreshed_with.lock().unwrap().push(token.to_string());
        match self.refreshes.get(token) {
            Some(fresh) => Ok(TokenGrant { token: fresh.clone(), refresh_token: None }),
            None => Err(ApiError::GraphQL(vec!["Error decoding signature".into()])),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenGrant, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        match self.logins.get(&(username.to_string(), password.to_string())) {
            Some(token) => Ok(TokenGrant { token: token.clone(), refresh_token: None }),
            None => Err(ApiError::GraphQL(vec!["Please enter valid credentials".into()])),
        }
    }

    async fn signup(&self, _form: &SignupForm) -> Result<(), ApiError> {
        self.signup_calls.fetch_add(1, Ordering::SeqCst);
        match &self.signup_error {
            Some(message) => Err(ApiError::Server { status: 400, message: message.clone() }),
            None => Ok(()),
        }
    }
}

/// Social backend with scripted toggle answers.
#[derive(Default)]
pub struct FakeSocialApi {
    answer: Mutex<Option<Result<ToggleAck, String>>>,
    gate: Option<Arc<Notify>>,
    feed_gate: Option<Arc<Notify>>,
    feed: Mutex<Option<Feed>>,
    profiles: Mutex<HashMap<String, ProfileView>>,
    like_calls: AtomicUsize,
    follow_calls: AtomicUsize,
    feed_calls: AtomicUsize,
    post_error: Option<String>,
    post_calls: AtomicUsize,
}

impl FakeSocialApi {
    /// Every toggle answers `ack`.
    pub fn answering(self, ack: ToggleAck) -> Self {
        *self.answer.lock().unwrap() = Some(Ok(ack));
        self
    }

    /// Every toggle is refused with `message`.
    pub fn rejecting(self, message: &str) -> Self {
        *self.answer.lock().unwrap() = Some(Err(message.into()));
        self
    }

    /// Toggles wait for `gate` to be notified before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Every post is refused with `message`.
    pub fn failing_posts(mut self, message: &str) -> Self {
        self.post_error = Some(message.into());
        self
    }

    /// Feed reads wait for `gate` to be notified before answering.
    pub fn gated_feed(mut self, gate: Arc<Notify>) -> Self {
        self.feed_gate = Some(gate);
        self
    }

    pub fn with_feed(self, feed: Feed) -> Self {
        *self.feed.lock().unwrap() = Some(feed);
        self
    }

    pub fn with_profile(self, view: ProfileView) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(view.summary.username.clone(), view);
        self
    }

    pub fn like_calls(&self) -> usize {
        self.like_calls.load(Ordering::SeqCst)
    }

    pub fn follow_calls(&self) -> usize {
        self.follow_calls.load(Ordering::SeqCst)
    }

    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }

    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<ToggleAck, ApiError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.answer.lock().unwrap().clone() {
            Some(Ok(ack)) => Ok(ack),
            Some(Err(message)) => Err(ApiError::GraphQL(vec![message])),
            None => Ok(ToggleAck { active: true, count: None }),
        }
    }
}

#[async_trait::async_trait]
impl SocialApi for FakeSocialApi {
    async fn toggle_like(&self, _post_id: &str) -> Result<ToggleAck, ApiError> {
        self.like_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await
    }

    async fn toggle_follow(&self, _username: &str) -> Result<ToggleAck, ApiError> {
        self.follow_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await
    }

    async fn create_post(&self, image: &str, caption: &str) -> Result<FeedPost, ApiError> {
        let n = self.post_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(message) = &self.post_error {
            return Err(ApiError::GraphQL(vec![message.clone()]));
        }
        let me = identity();
        Ok(FeedPost {
            id: format!("new-{}", n),
            author: Author {
                id: me.id,
                username: me.username,
                display_name: me.display_name,
                avatar: me.avatar,
            },
            image: Some(image.to_string()),
            caption: caption.to_string(),
            created_at: "2024-05-03T08:00:00Z".into(),
            likers: Vec::new(),
        })
    }

    async fn feed(&self) -> Result<Feed, ApiError> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.feed_gate {
            gate.notified().await;
        }
        self.feed
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Server { status: 500, message: "feed unavailable".into() })
    }

    async fn profile(&self, username: &str) -> Result<ProfileView, ApiError> {
        self.profiles
            .lock()
            .unwrap()
            .get(username)
            .cloned()
            .ok_or_else(|| ApiError::Server { status: 404, message: format!("user '{}' not found", username) })
    }
}

/// Key-value store whose writes and deletes always fail.
pub struct BrokenStore;

impl KVStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), KVError> {
        Err(KVError::Storage("disk full".into()))
    }

    fn delete(&self, _key: &str) -> Result<(), KVError> {
        Err(KVError::Storage("disk full".into()))
    }

    fn scan(&self, _prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        Ok(Vec::new())
    }
}

/// Navigator that records targets and still writes `app/route`.
pub struct RecordingNavigator {
    inner: StateNavigator,
    seen: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, target: &str) {
        self.seen.lock().unwrap().push(target.to_string());
        self.inner.redirect(target);
    }
}

/// Everything a service under test needs, wired over shared fakes.
pub struct Harness {
    pub kv: Arc<MemoryStore>,
    pub credentials: CredentialStore,
    pub store: Arc<StateStore>,
    pub session_api: Arc<FakeSessionApi>,
    pub social_api: Arc<FakeSocialApi>,
    pub navigator: Arc<RecordingNavigator>,
    pub notices: Arc<NoticeBoard>,
    pub config: SessionConfig,
}

impl Harness {
    pub fn new(session_api: FakeSessionApi) -> Self {
        Self::with_social(session_api, FakeSocialApi::default())
    }

    pub fn with_social(session_api: FakeSessionApi, social_api: FakeSocialApi) -> Self {
        let kv = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::new(kv.clone());
        let _ = session_api.credentials.set(credentials.clone());
        let store = Arc::new(StateStore::new());
        let config = SessionConfig::default();
        Self {
            navigator: Arc::new(RecordingNavigator {
                inner: StateNavigator::new(store.clone()),
                seen: Mutex::new(Vec::new()),
            }),
            notices: Arc::new(NoticeBoard::new(store.clone(), config.notice_ttl_secs)),
            session_api: Arc::new(session_api),
            social_api: Arc::new(social_api),
            kv,
            credentials,
            store,
            config,
        }
    }
}
