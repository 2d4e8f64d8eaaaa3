//! Process-wide session service.

use std::sync::Arc;

use socialbook_client::{Identity, SessionApi, SignupForm};
use socialbook_flux::StateStore;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::credential::CredentialStore;
use crate::error::SessionError;
use crate::guard::{GuardOutcome, SessionGuard};
use crate::navigator::Navigator;
use crate::notifier::Notifier;
use crate::state::{AuthPhase, AuthState, FeedState, Notice, ProfilePage, RelationState};

const LOGIN_FAILED: &str = "Error";
const SIGNUP_FAILED: &str = "Account Hasn't been Created!";
const SIGNUP_FALLBACK: &str = "Try Again Later !";

/// Read-only view of the broadcast identity.
#[derive(Clone)]
pub struct IdentityContext {
    store: Arc<StateStore>,
}

impl IdentityContext {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self { store }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.store
            .read::<AuthState>(AuthState::PATH)
            .filter(AuthState::is_authenticated)
            .and_then(|s| s.identity)
    }

    pub fn phase(&self) -> AuthPhase {
        self.store
            .read::<AuthState>(AuthState::PATH)
            .map(|s| s.phase)
            .unwrap_or(AuthPhase::Unchecked)
    }

    /// Username of the acting user; relation keys are scoped by it.
    pub fn actor(&self) -> Option<String> {
        self.identity().map(|i| i.username)
    }
}

pub struct SessionManager {
    credentials: CredentialStore,
    api: Arc<dyn SessionApi>,
    guard: SessionGuard,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    store: Arc<StateStore>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(
        credentials: CredentialStore,
        api: Arc<dyn SessionApi>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        store: Arc<StateStore>,
        config: SessionConfig,
    ) -> Self {
        let guard = SessionGuard::new(
            credentials.clone(),
            api.clone(),
            navigator.clone(),
            store.clone(),
            config.clone(),
        );
        Self { credentials, api, guard, navigator, notifier, store, config }
    }

    /// Run the session guard for `current_url`.
    pub async fn check(&self, current_url: &str) -> GuardOutcome {
        self.guard.check(current_url).await
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        callback_url: Option<&str>,
    ) -> Result<Identity, SessionError> {
        self.authenticate(username, password, callback_url, LOGIN_FAILED)
            .await
    }

    /// Create the account, then log in with the same credentials.
    pub async fn signup(
        &self,
        form: &SignupForm,
        callback_url: Option<&str>,
    ) -> Result<Identity, SessionError> {
        if let Err(message) = form.validate() {
            self.notifier.notify(Notice::new(LOGIN_FAILED, message.clone()));
            return Err(SessionError::Validation(message));
        }

        self.set_busy();
        if let Err(e) = self.api.signup(form).await {
            let err = SessionError::from(e);
            let message = match err.message() {
                m if m.is_empty() => SIGNUP_FALLBACK.to_string(),
                m => m,
            };
            warn!(username = %form.username, error = %err, "signup failed");
            self.notifier.notify(Notice::new(SIGNUP_FAILED, message.clone()));
            self.store
                .set(AuthState::PATH, AuthState::unauthenticated(Some(message)));
            return Err(err);
        }
        info!(username = %form.username, "account created");

        self.authenticate(&form.username, &form.password, callback_url, SIGNUP_FAILED)
            .await
    }

    /// Teardown: forget the credential and everything derived from it.
    /// The in-memory session is torn down even if the stored tokens cannot
    /// be deleted; that failure is returned afterwards.
    pub fn logout(&self) -> Result<(), SessionError> {
        let cleared = self.credentials.clear();
        self.store.set(AuthState::PATH, AuthState::unauthenticated(None));
        self.store.remove(FeedState::PATH);
        self.store.remove_prefix(ProfilePage::PATH);
        self.store.remove_prefix(RelationState::PATH);
        self.navigator.redirect(&self.config.login_path);
        match cleared {
            Ok(()) => {
                info!("logged out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "logged out, but stored tokens were not deleted");
                Err(e.into())
            }
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.context().identity()
    }

    pub fn context(&self) -> IdentityContext {
        IdentityContext::new(self.store.clone())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn set_busy(&self) {
        self.store.update::<AuthState, _>(AuthState::PATH, |s| AuthState {
            busy: true,
            error: None,
            ..s.unwrap_or_default()
        });
    }

    /// Obtain a token, store it, go to the landing page and let the guard
    /// establish the identity there.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        callback_url: Option<&str>,
        failure_title: &str,
    ) -> Result<Identity, SessionError> {
        self.set_busy();
        let grant = match self.api.login(username, password).await {
            Ok(grant) => grant,
            Err(e) => {
                let err = SessionError::from(e);
                warn!(username, error = %err, "login failed");
                self.notifier.notify(Notice::new(failure_title, err.message()));
                self.store
                    .set(AuthState::PATH, AuthState::unauthenticated(Some(err.message())));
                return Err(err);
            }
        };
        if let Err(e) = self.credentials.replace(&grant) {
            let err = SessionError::from(e);
            warn!(username, error = %err, "storing credential failed");
            self.notifier.notify(Notice::new(failure_title, err.message()));
            self.store
                .set(AuthState::PATH, AuthState::unauthenticated(Some(err.message())));
            return Err(err);
        }
        info!(username, "logged in");

        let landing = self.config.landing(callback_url);
        self.navigator.redirect(&landing);
        match self.guard.check(&landing).await {
            GuardOutcome::Authenticated(identity) => Ok(identity),
            GuardOutcome::Redirected(_) => Err(SessionError::AuthenticationInvalid(
                "issued token was not accepted".into(),
            )),
        }
    }
}
