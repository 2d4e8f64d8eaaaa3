/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// Transport failure: DNS, connect, timeout, TLS.
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// The GraphQL response carried `errors`.
    #[error("graphql: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    /// The token source could not supply a credential, or the server
    /// answered without an identity for it.
    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for transport-level failures only.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Human-readable message without the variant prefix, suitable for a
    /// notice body.
    pub fn message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Network(e) => e.to_string(),
            ApiError::GraphQL(messages) => messages
                .first()
                .cloned()
                .unwrap_or_else(|| "request failed".to_string()),
            ApiError::Auth(m) | ApiError::Decode(m) => m.clone(),
        }
    }
}
