//! Request payloads emitted by the UI.
//!
//! Each struct is a typed request payload with a `PATH` const that the
//! handlers register under.

pub mod app;
pub mod auth;
pub mod notice;
pub mod post;
pub mod user;

pub use app::{FeedLoadReq, InitializeReq};
pub use auth::{CheckSessionReq, LoginReq, LogoutReq, SignupReq};
pub use notice::DismissNoticeReq;
pub use post::{CreatePostReq, ToggleLikeReq};
pub use user::{LoadProfileReq, ToggleFollowReq};
