//! User handlers.

use tracing::warn;

use crate::handlers::AppContext;
use crate::reconciler::ToggleOutcome;
use crate::request::*;
use crate::state::RelationKey;

/// Handle `user/toggle-follow`.
pub async fn handle_toggle_follow(req: &ToggleFollowReq, ctx: &AppContext) -> Option<ToggleOutcome> {
    let Some(actor) = ctx.identity.actor() else {
        warn!(username = %req.username, "follow ignored: not authenticated");
        return None;
    };
    if actor == req.username {
        warn!(username = %req.username, "follow ignored: cannot follow yourself");
        return None;
    }
    Some(ctx.reconciler.toggle(RelationKey::follow(actor, &req.username)).await)
}
