//! State types written into the Flux store.
//!
//! Each type carries its path as a `PATH` const. Types stored under a
//! per-entity path (`profile/{username}`, `relation/...`) use `PATH` as the
//! prefix and expose a `path_for` helper.

pub mod app;
pub mod auth;
pub mod feed;
pub mod notice;
pub mod profile;
pub mod relation;

pub use app::AppRoute;
pub use auth::{AuthPhase, AuthState};
pub use feed::FeedState;
pub use notice::{Notice, NoticeEntry, NoticeList};
pub use profile::ProfilePage;
pub use relation::{MutationPhase, Relation, RelationKey, RelationKind, RelationState};
