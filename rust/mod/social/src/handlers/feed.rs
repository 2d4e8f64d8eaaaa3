//! Feed and profile loading handlers.

use socialbook_flux::StateStore;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::handlers::{helpers, AppContext};
use crate::request::*;
use crate::state::*;

/// Handle `feed/load`.
pub async fn handle_feed_load(store: &StateStore, ctx: &AppContext) {
    let Some(actor) = ctx.identity.actor() else {
        warn!("feed/load without an authenticated identity");
        return;
    };

    store.update::<FeedState, _>(FeedState::PATH, FeedState::loading);

    let epoch = ctx.reconciler.epoch();
    match ctx.social.feed().await {
        Ok(feed) => {
            let seeded = helpers::seed_feed(&ctx.reconciler, &actor, &feed, epoch);
            debug!(posts = feed.posts.len(), suggestions = feed.suggestions.len(), seeded, "feed loaded");
            store.set(
                FeedState::PATH,
                FeedState {
                    posts: feed.posts,
                    suggestions: feed.suggestions,
                    loading: false,
                    error: None,
                },
            );
        }
        Err(e) => {
            let err = SessionError::from(e);
            warn!(error = %err, "feed load failed");
            store.update::<FeedState, _>(FeedState::PATH, |prev| FeedState {
                loading: false,
                error: Some(err.message()),
                ..prev.unwrap_or_default()
            });
        }
    }
}

/// Handle `profile/load`.
pub async fn handle_load_profile(req: &LoadProfileReq, store: &StateStore, ctx: &AppContext) {
    let Some(actor) = ctx.identity.actor() else {
        warn!(username = %req.username, "profile/load without an authenticated identity");
        return;
    };
    let path = ProfilePage::path_for(&req.username);

    store.update::<ProfilePage, _>(&path, |prev| ProfilePage {
        username: req.username.clone(),
        view: prev.and_then(|p| p.view),
        loading: true,
        error: None,
    });

    let epoch = ctx.reconciler.epoch();
    match ctx.social.profile(&req.username).await {
        Ok(view) => {
            let seeded = helpers::seed_profile(&ctx.reconciler, &actor, &view, epoch);
            debug!(username = %req.username, posts = view.posts.len(), seeded, "profile loaded");
            store.set(
                &path,
                ProfilePage {
                    username: req.username.clone(),
                    view: Some(view),
                    loading: false,
                    error: None,
                },
            );
        }
        Err(e) => {
            let err = SessionError::from(e);
            warn!(username = %req.username, error = %err, "profile load failed");
            store.set(
                &path,
                ProfilePage {
                    username: req.username.clone(),
                    view: None,
                    loading: false,
                    error: Some(err.message()),
                },
            );
        }
    }
}
