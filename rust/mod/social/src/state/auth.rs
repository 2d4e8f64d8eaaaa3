//! Auth state, stored at `auth/state`.

use flux_derive::state;
use serde::{Deserialize, Serialize};
use socialbook_client::Identity;

/// Session guard state and the broadcast identity.
#[state("auth/state")]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub phase: AuthPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthPhase {
    Unchecked,
    Checking,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn unchecked() -> Self {
        Self { phase: AuthPhase::Unchecked, identity: None, busy: false, error: None }
    }

    pub fn checking() -> Self {
        Self { phase: AuthPhase::Checking, identity: None, busy: true, error: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self { phase: AuthPhase::Authenticated, identity: Some(identity), busy: false, error: None }
    }

    pub fn unauthenticated(error: Option<String>) -> Self {
        Self { phase: AuthPhase::Unauthenticated, identity: None, busy: false, error }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated && self.identity.is_some()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::unchecked()
    }
}
