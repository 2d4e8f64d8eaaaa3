use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::token::TokenSource;

/// Authorization scheme the backend's JWT middleware expects.
pub const DEFAULT_AUTH_SCHEME: &str = "JWT";

#[derive(Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse<R> {
    data: Option<R>,
    #[serde(default)]
    errors: Vec<GraphqlErrorItem>,
}

#[derive(Deserialize)]
struct GraphqlErrorItem {
    message: String,
}

/// GraphQL-over-HTTP transport for a single endpoint.
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    token_source: Arc<dyn TokenSource>,
    scheme: String,
}

impl GraphqlClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        token_source: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token_source,
            scheme: DEFAULT_AUTH_SCHEME.to_string(),
        }
    }

    /// Override the Authorization scheme (default `JWT`).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run an operation carrying the current token.
    pub async fn execute<V, R>(&self, document: &str, variables: V) -> Result<R, ApiError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let req = self.http.post(&self.endpoint);
        let req = self.authed(req).await?;
        self.send(req, document, variables).await
    }

    /// Run an operation without an Authorization header. Used for login and
    /// token refresh, where a stale header would be rejected outright.
    pub async fn execute_anonymous<V, R>(&self, document: &str, variables: V) -> Result<R, ApiError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let req = self.http.post(&self.endpoint);
        self.send(req, document, variables).await
    }

    async fn authed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token_source.token().await? {
            Some(token) => Ok(builder.header(
                reqwest::header::AUTHORIZATION,
                format!("{} {}", self.scheme, token),
            )),
            None => Ok(builder),
        }
    }

    async fn send<V, R>(
        &self,
        builder: reqwest::RequestBuilder,
        document: &str,
        variables: V,
    ) -> Result<R, ApiError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let resp = builder
            .json(&GraphqlRequest { query: document, variables })
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "graphql response");
        parse_body(status.as_u16(), &body)
    }
}

/// Map a raw GraphQL HTTP response to data or an `ApiError`.
///
/// GraphQL servers often answer 200 with `errors`, and some answer 4xx with
/// a GraphQL body; both forms surface the `errors` messages.
pub(crate) fn parse_body<R: DeserializeOwned>(status: u16, body: &str) -> Result<R, ApiError> {
    let parsed: Result<GraphqlResponse<R>, _> = serde_json::from_str(body);
    match parsed {
        Ok(resp) if !resp.errors.is_empty() => Err(ApiError::GraphQL(
            resp.errors.into_iter().map(|e| e.message).collect(),
        )),
        Ok(_) if !(200..300).contains(&status) => Err(ApiError::Server {
            status,
            message: body.to_string(),
        }),
        Ok(resp) => resp
            .data
            .ok_or_else(|| ApiError::Decode("response has no data".into())),
        Err(_) if !(200..300).contains(&status) => Err(ApiError::Server {
            status,
            message: body.to_string(),
        }),
        Err(e) => Err(ApiError::Decode(format!("response body: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Ping {
        pong: bool,
    }

    #[test]
    fn data_is_returned() {
        let ping: Ping = parse_body(200, r#"{"data":{"pong":true}}"#).unwrap();
        assert!(ping.pong);
    }

    #[test]
    fn errors_win_over_partial_data() {
        let err = parse_body::<Ping>(
            200,
            r#"{"data":null,"errors":[{"message":"Signature has expired","path":["myProfile"]}]}"#,
        )
        .unwrap_err();
        match err {
            ApiError::GraphQL(m) => assert_eq!(m, vec!["Signature has expired"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_error_status_is_server_error() {
        let err = parse_body::<Ping>(502, "bad gateway").unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
    }

    #[test]
    fn missing_data_is_decode_error() {
        let err = parse_body::<Ping>(200, "{}").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
