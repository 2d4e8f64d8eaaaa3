use socialbook_client::ApiError;
use socialbook_kv::KVError;

/// Session and mutation failures as the rest of the app sees them.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credential is past its lifetime; one refresh may recover it.
    #[error("authentication expired: {0}")]
    AuthenticationExpired(String),

    /// The credential is missing, malformed or refused.
    #[error("authentication invalid: {0}")]
    AuthenticationInvalid(String),

    /// The server declined the request.
    #[error("rejected: {0}")]
    MutationRejected(String),

    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Local form check failed before anything was sent.
    #[error("{0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(#[from] KVError),
}

impl SessionError {
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            SessionError::AuthenticationExpired(_) | SessionError::AuthenticationInvalid(_)
        )
    }

    /// Message suitable for a notice body.
    pub fn message(&self) -> String {
        match self {
            SessionError::AuthenticationExpired(m)
            | SessionError::AuthenticationInvalid(m)
            | SessionError::MutationRejected(m)
            | SessionError::NetworkUnavailable(m)
            | SessionError::Validation(m) => m.clone(),
            SessionError::Storage(e) => e.to_string(),
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        let message = err.message();
        match &err {
            ApiError::Network(_) => SessionError::NetworkUnavailable(message),
            ApiError::Auth(_) => SessionError::AuthenticationInvalid(message),
            ApiError::Server { status: 401 | 403, .. } => {
                SessionError::AuthenticationInvalid(message)
            }
            ApiError::GraphQL(messages) => classify_graphql(messages, message),
            ApiError::Server { .. } | ApiError::Decode(_) => {
                SessionError::MutationRejected(message)
            }
        }
    }
}

/// JWT middleware errors arrive as plain GraphQL messages
/// ("Signature has expired", "Error decoding signature",
/// "You do not have permission to perform this action").
fn classify_graphql(messages: &[String], message: String) -> SessionError {
    let lower: Vec<String> = messages.iter().map(|m| m.to_lowercase()).collect();
    if lower.iter().any(|m| m.contains("expired")) {
        SessionError::AuthenticationExpired(message)
    } else if lower.iter().any(|m| {
        m.contains("permission") || m.contains("signature") || m.contains("credentials")
    }) {
        SessionError::AuthenticationInvalid(message)
    } else {
        SessionError::MutationRejected(message)
    }
}
