//! Remote API boundary for the socialbook client.
//!
//! The backend speaks GraphQL over HTTP (`{api_url}/graphql`) plus one REST
//! endpoint for account creation. Callers depend on the [`SessionApi`] and
//! [`SocialApi`] traits; [`HttpApi`] is the production implementation and
//! tests substitute in-memory fakes.
//!
//! Authentication is pluggable through [`TokenSource`], consulted before
//! every authenticated request.
//!
//! ```ignore
//! use socialbook_client::{HttpApi, StaticToken, SessionApi};
//!
//! let api = HttpApi::new("http://localhost:8000", Arc::new(StaticToken::new("jwt")));
//! let me = api.fetch_identity().await?;
//! ```

pub mod api;
pub mod error;
pub mod graphql;
pub mod http;
pub mod model;
pub mod token;

pub use api::{SessionApi, SocialApi};
pub use error::ApiError;
pub use graphql::GraphqlClient;
pub use http::HttpApi;
pub use model::{
    Author, Feed, FeedPost, Identity, ProfilePost, ProfileSummary, ProfileView, SignupForm,
    ToggleAck, TokenGrant,
};
pub use token::{NoAuth, StaticToken, TokenSource};
