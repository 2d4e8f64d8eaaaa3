//! Session guard: validate the stored credential on app entry.
//!
//! One identity fetch, at most one refresh, at most one retried fetch.
//! Any failure along the way clears both tokens and redirects to the login
//! entry point with the original URL in `callbackUrl`.

use std::sync::Arc;

use socialbook_client::{Identity, SessionApi};
use socialbook_flux::StateStore;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::credential::CredentialStore;
use crate::error::SessionError;
use crate::navigator::Navigator;
use crate::state::AuthState;

/// How a guard check ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    Authenticated(Identity),
    /// Sent to the login page; carries the redirect target.
    Redirected(String),
}

pub struct SessionGuard {
    credentials: CredentialStore,
    api: Arc<dyn SessionApi>,
    navigator: Arc<dyn Navigator>,
    store: Arc<StateStore>,
    config: SessionConfig,
}

impl SessionGuard {
    pub fn new(
        credentials: CredentialStore,
        api: Arc<dyn SessionApi>,
        navigator: Arc<dyn Navigator>,
        store: Arc<StateStore>,
        config: SessionConfig,
    ) -> Self {
        Self { credentials, api, navigator, store, config }
    }

    /// Run the check for a user currently on `current_url`.
    pub async fn check(&self, current_url: &str) -> GuardOutcome {
        self.store.set(AuthState::PATH, AuthState::checking());

        let access = self.read_token(self.credentials.access_token());
        let refresh = self.read_token(self.credentials.refresh_token());

        let refresh_with = match (&access, refresh) {
            (None, None) => {
                debug!("no stored credential");
                return self.invalidate(current_url);
            }
            (_, Some(refresh)) => refresh,
            (Some(access), None) => access.clone(),
        };

        if access.is_some() {
            match self.api.fetch_identity().await {
                Ok(identity) => return self.accept(identity),
                Err(e) => {
                    let err = SessionError::from(e);
                    debug!(error = %err, "identity check failed, refreshing");
                }
            }
        } else {
            debug!("no access token, refreshing");
        }

        let grant = match self.api.refresh(&refresh_with).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(error = %SessionError::from(e), "token refresh failed");
                return self.invalidate(current_url);
            }
        };
        if let Err(e) = self.credentials.store(&grant) {
            warn!(error = %e, "could not persist refreshed token");
            return self.invalidate(current_url);
        }

        match self.api.fetch_identity().await {
            Ok(identity) => self.accept(identity),
            Err(e) => {
                warn!(error = %SessionError::from(e), "identity check failed after refresh");
                self.invalidate(current_url)
            }
        }
    }

    fn read_token(&self, result: Result<Option<String>, socialbook_kv::KVError>) -> Option<String> {
        result.unwrap_or_else(|e| {
            warn!(error = %e, "could not read stored token");
            None
        })
    }

    fn accept(&self, identity: Identity) -> GuardOutcome {
        info!(username = %identity.username, "session authenticated");
        self.store
            .set(AuthState::PATH, AuthState::authenticated(identity.clone()));
        GuardOutcome::Authenticated(identity)
    }

    fn invalidate(&self, current_url: &str) -> GuardOutcome {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "could not clear stored credential");
        }
        self.store.set(AuthState::PATH, AuthState::unauthenticated(None));
        let target = self.config.login_redirect(current_url);
        info!(%target, "session invalid, redirecting");
        self.navigator.redirect(&target);
        GuardOutcome::Redirected(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{ACCESS_KEY, REFRESH_KEY};
    use crate::state::{AppRoute, AuthPhase};
    use crate::testing::{identity, FakeSessionApi, Harness};
    use socialbook_kv::KVStore;

    fn guard(h: &Harness) -> SessionGuard {
        SessionGuard::new(
            h.credentials.clone(),
            h.session_api.clone(),
            h.navigator.clone(),
            h.store.clone(),
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn no_credential_redirects_without_network() {
        let h = Harness::new(FakeSessionApi::default());
        let outcome = guard(&h).check("/profile/bob?tab=posts").await;

        let target = "/login?callbackUrl=%2Fprofile%2Fbob%3Ftab%3Dposts";
        assert_eq!(outcome, GuardOutcome::Redirected(target.into()));
        assert_eq!(h.session_api.total_calls(), 0);
        assert_eq!(h.navigator.redirects(), vec![target.to_string()]);
        assert_eq!(h.store.read::<AppRoute>(AppRoute::PATH), Some(AppRoute(target.into())));
        let auth = h.store.read::<AuthState>(AuthState::PATH).unwrap();
        assert_eq!(auth.phase, AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn valid_credential_authenticates() {
        let api = FakeSessionApi::default().accepting("good");
        let h = Harness::new(api);
        h.kv.set_string(ACCESS_KEY, "good").unwrap();

        let outcome = guard(&h).check("/feed").await;

        assert_eq!(outcome, GuardOutcome::Authenticated(identity()));
        assert_eq!(h.session_api.identity_calls(), 1);
        assert_eq!(h.session_api.refresh_calls(), 0);
        assert!(h.navigator.redirects().is_empty());
        let auth = h.store.read::<AuthState>(AuthState::PATH).unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.identity, Some(identity()));
    }

    #[tokio::test]
    async fn expired_access_refreshes_once_and_retries() {
        let api = FakeSessionApi::default()
            .accepting("fresh-123")
            .refreshing("valid-xyz", "fresh-123");
        let h = Harness::new(api);
        h.kv.set_string(ACCESS_KEY, "expired-abc").unwrap();
        h.kv.set_string(REFRESH_KEY, "valid-xyz").unwrap();

        let outcome = guard(&h).check("/feed").await;

        assert_eq!(outcome, GuardOutcome::Authenticated(identity()));
        assert_eq!(h.session_api.refresh_calls(), 1);
        assert_eq!(h.session_api.identity_calls(), 2);
        assert_eq!(h.session_api.refreshed_with(), vec!["valid-xyz".to_string()]);
        assert_eq!(h.kv.get_string(ACCESS_KEY).unwrap().as_deref(), Some("fresh-123"));
        assert!(h.navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn refresh_falls_back_to_access_token() {
        let api = FakeSessionApi::default()
            .accepting("fresh-123")
            .refreshing("expired-abc", "fresh-123");
        let h = Harness::new(api);
        h.kv.set_string(ACCESS_KEY, "expired-abc").unwrap();

        let outcome = guard(&h).check("/feed").await;

        assert!(matches!(outcome, GuardOutcome::Authenticated(_)));
        assert_eq!(h.session_api.refreshed_with(), vec!["expired-abc".to_string()]);
    }

    #[tokio::test]
    async fn missing_access_token_goes_straight_to_refresh() {
        let api = FakeSessionApi::default()
            .accepting("fresh-123")
            .refreshing("valid-xyz", "fresh-123");
        let h = Harness::new(api);
        h.kv.set_string(REFRESH_KEY, "valid-xyz").unwrap();

        let outcome = guard(&h).check("/feed").await;

        assert!(matches!(outcome, GuardOutcome::Authenticated(_)));
        assert_eq!(h.session_api.identity_calls(), 1);
        assert_eq!(h.session_api.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn both_failing_clears_tokens_and_redirects_once() {
        let h = Harness::new(FakeSessionApi::default());
        h.kv.set_string(ACCESS_KEY, "expired-abc").unwrap();
        h.kv.set_string(REFRESH_KEY, "revoked").unwrap();

        let outcome = guard(&h).check("/feed").await;

        assert_eq!(outcome, GuardOutcome::Redirected("/login?callbackUrl=%2Ffeed".into()));
        assert_eq!(h.session_api.identity_calls(), 1);
        assert_eq!(h.session_api.refresh_calls(), 1);
        assert!(h.kv.get(ACCESS_KEY).unwrap().is_none());
        assert!(h.kv.get(REFRESH_KEY).unwrap().is_none());
        assert_eq!(h.navigator.redirects().len(), 1);
    }

    #[tokio::test]
    async fn retry_failure_after_refresh_redirects() {
        // Refresh succeeds but the new token is still refused.
        let api = FakeSessionApi::default().refreshing("valid-xyz", "fresh-123");
        let h = Harness::new(api);
        h.kv.set_string(ACCESS_KEY, "expired-abc").unwrap();
        h.kv.set_string(REFRESH_KEY, "valid-xyz").unwrap();

        let outcome = guard(&h).check("/feed").await;

        assert!(matches!(outcome, GuardOutcome::Redirected(_)));
        assert_eq!(h.session_api.identity_calls(), 2);
        assert_eq!(h.session_api.refresh_calls(), 1);
        assert!(h.kv.get(ACCESS_KEY).unwrap().is_none());
        assert_eq!(h.navigator.redirects().len(), 1);
    }
}
