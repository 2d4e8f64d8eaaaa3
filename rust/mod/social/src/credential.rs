use std::sync::Arc;

use socialbook_client::{ApiError, TokenGrant, TokenSource};
use socialbook_kv::{KVError, KVStore};
use tracing::debug;

/// Storage key of the access token.
pub const ACCESS_KEY: &str = "JWTToken";
/// Storage key of the refresh token.
pub const REFRESH_KEY: &str = "JWTRefreshToken";

/// Session tokens in the persisted key-value store.
///
/// Also the production [`TokenSource`]: every API request reads the
/// current access token from here, so a refresh takes effect on the next
/// request without rebuilding the client.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KVStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    pub fn access_token(&self) -> Result<Option<String>, KVError> {
        Ok(self.kv.get_string(ACCESS_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn refresh_token(&self) -> Result<Option<String>, KVError> {
        Ok(self.kv.get_string(REFRESH_KEY)?.filter(|t| !t.is_empty()))
    }

    /// True if either token is stored.
    pub fn has_any(&self) -> Result<bool, KVError> {
        Ok(self.access_token()?.is_some() || self.refresh_token()?.is_some())
    }

    /// Persist a grant. A grant without a refresh token leaves any stored
    /// refresh token in place.
    pub fn store(&self, grant: &TokenGrant) -> Result<(), KVError> {
        self.kv.set_string(ACCESS_KEY, &grant.token)?;
        if let Some(refresh) = &grant.refresh_token {
            self.kv.set_string(REFRESH_KEY, refresh)?;
        }
        debug!(refresh = grant.refresh_token.is_some(), "stored credential");
        Ok(())
    }

    /// Replace whatever is stored with `grant`. Used for fresh logins, where
    /// a refresh token left by an earlier session must not survive.
    pub fn replace(&self, grant: &TokenGrant) -> Result<(), KVError> {
        self.clear()?;
        self.store(grant)
    }

    /// Delete both tokens.
    pub fn clear(&self) -> Result<(), KVError> {
        self.kv.batch_delete(&[ACCESS_KEY, REFRESH_KEY])?;
        debug!("cleared credential");
        Ok(())
    }
}

#[async_trait::async_trait]
impl TokenSource for CredentialStore {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        self.access_token()
            .map_err(|e| ApiError::Auth(format!("reading stored token: {}", e)))
    }
}
