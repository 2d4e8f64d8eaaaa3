//! App lifecycle handlers.

use socialbook_flux::StateStore;
use tracing::debug;

use crate::handlers::AppContext;
use crate::request::*;
use crate::state::*;

/// Handle `app/initialize`: start from a clean tree, then run the guard.
pub async fn handle_initialize(req: &InitializeReq, store: &StateStore, ctx: &AppContext) {
    store.set(AuthState::PATH, AuthState::unchecked());
    store.set(NoticeList::PATH, NoticeList::default());
    store.remove(FeedState::PATH);
    store.remove_prefix(ProfilePage::PATH);
    store.remove_prefix(RelationState::PATH);

    ctx.session.check(&req.current_url).await;
}

/// Handle `notice/dismiss`. Expired notices go at the same time.
pub async fn handle_dismiss_notice(req: &DismissNoticeReq, ctx: &AppContext) {
    let removed = ctx.notices.dismiss(req.id);
    let pruned = ctx.notices.prune();
    debug!(id = req.id, removed, pruned, "notice dismissed");
}
