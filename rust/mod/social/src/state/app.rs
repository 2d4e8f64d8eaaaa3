//! App-level state, stored at `app/route`.

use flux_derive::state;

/// Current navigation target. The UI follows it.
#[state("app/route")]
pub struct AppRoute(pub String);
