//! Social client core.
//!
//! Session lifecycle and relation state for the socialbook client. The UI
//! talks to this crate only through Flux: it emits requests
//! (`auth/login`, `post/toggle-like`, ...) and renders whatever lands in
//! the state tree (`auth/state`, `relation/like/{actor}/{post}`, ...).
//!
//! - [`SessionGuard`] validates the stored credential on entry, refreshing
//!   it once before giving up and redirecting to login.
//! - [`SessionManager`] owns login, signup and logout around the guard.
//! - [`Reconciler`] applies like/follow toggles optimistically and settles
//!   them against the server's answer.
//!
//! [`register_handlers`] wires all of it into a [`socialbook_flux::Flux`].

pub mod config;
pub mod credential;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod navigator;
pub mod notifier;
pub mod reconciler;
pub mod request;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::SessionConfig;
pub use credential::CredentialStore;
pub use error::SessionError;
pub use guard::{GuardOutcome, SessionGuard};
pub use handlers::{register_handlers, AppContext};
pub use navigator::{Navigator, StateNavigator};
pub use notifier::{NoticeBoard, Notifier};
pub use reconciler::{Reconciler, ToggleOutcome};
pub use session::{IdentityContext, SessionManager};
