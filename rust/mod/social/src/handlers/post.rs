//! Post handlers.

use socialbook_client::FeedPost;
use socialbook_flux::StateStore;
use tracing::{info, warn};

use crate::error::SessionError;
use crate::handlers::AppContext;
use crate::notifier::Notifier;
use crate::reconciler::ToggleOutcome;
use crate::request::*;
use crate::state::{FeedState, Notice, Relation, RelationKey};

const MISSING_FIELDS: &str = "Please write a caption and select an image to post.";

/// Handle `post/toggle-like`.
pub async fn handle_toggle_like(req: &ToggleLikeReq, ctx: &AppContext) -> Option<ToggleOutcome> {
    let Some(actor) = ctx.identity.actor() else {
        warn!(post_id = %req.post_id, "like ignored: not authenticated");
        return None;
    };
    Some(ctx.reconciler.toggle(RelationKey::like(actor, &req.post_id)).await)
}

/// Handle `post/create`: publish, then put the post at the top of the feed.
pub async fn handle_create_post(
    req: &CreatePostReq,
    store: &StateStore,
    ctx: &AppContext,
) -> Result<FeedPost, SessionError> {
    let Some(actor) = ctx.identity.actor() else {
        warn!("post ignored: not authenticated");
        return Err(SessionError::AuthenticationInvalid("not logged in".into()));
    };

    let caption = req.caption.trim();
    if caption.is_empty() || req.image.trim().is_empty() {
        ctx.notices.notify(Notice::new("Validation Error", MISSING_FIELDS));
        return Err(SessionError::Validation(MISSING_FIELDS.into()));
    }

    let post = match ctx.social.create_post(&req.image, caption).await {
        Ok(post) => post,
        Err(e) => {
            let err = SessionError::from(e);
            warn!(error = %err, "create post failed");
            ctx.notices.notify(Notice::new(
                "Failed to Post",
                format!("Something went wrong: {}", err.message()),
            ));
            return Err(err);
        }
    };
    info!(post_id = %post.id, "post shared");

    ctx.reconciler.seed(&RelationKey::like(&actor, &post.id), Relation::new(false, 0));
    store.update::<FeedState, _>(FeedState::PATH, |prev| {
        let mut feed = prev.unwrap_or_default();
        feed.posts.insert(0, post.clone());
        feed
    });
    ctx.notices.notify(Notice::new(
        "Post shared!",
        "Your post has been shared with your followers.",
    ));
    Ok(post)
}
