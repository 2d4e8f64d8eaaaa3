//! Flux: client state engine for the socialbook app.
//!
//! Rust owns the session, the feed and every toggle; the UI layer only
//! renders what it reads and emits requests for what the user does.
//!
//! # Three Primitives
//!
//! - `get(path)`: read state at a path, Arc zero-copy
//! - `emit(path, payload)`: send a request, pattern-routed to handler(s)
//! - `subscribe(pattern)`: observe state changes
//!
//! # Path Addressing
//!
//! State and requests share a flat `/`-separated namespace:
//! - Global: `auth/state`, `app/route`, `notice/list`
//! - Per item: `profile/{username}`
//! - Keyed relations: `relation/like/{actor}/{post_id}`
//!
//! # Patterns
//!
//! Subscriptions and request handlers use MQTT-style wildcards:
//! - Exact: `auth/state`
//! - Single-level: `relation/like/+/p1` matches any actor liking `p1`
//! - Multi-level: `relation/#` matches every relation
//!
//! # Example
//!
//! ```ignore
//! use socialbook_flux::Flux;
//!
//! let app = Flux::new();
//!
//! app.on("auth/logout", |_, _, store| async move {
//!     store.set("app/route", "/login".to_string());
//! });
//!
//! app.subscribe("app/#", |path, _| println!("{} changed", path));
//!
//! app.emit("auth/logout", ()).await;
//! ```

pub mod app;
pub mod router;
pub mod store;
pub mod topic;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Router};
pub use store::{ChangeHandler, StateStore};
pub use topic::{Pattern, PatternTable};
pub use value::{StateValue, SubscriptionId};
