//! Shared helpers for handlers.

use socialbook_client::{Feed, ProfileView};

use crate::reconciler::Reconciler;
use crate::state::{Relation, RelationKey};

/// Seed like relations for the feed's posts and follow relations for the
/// suggestions, fetched at `epoch`. Returns how many relations were written.
pub fn seed_feed(reconciler: &Reconciler, actor: &str, feed: &Feed, epoch: u64) -> usize {
    let mut written = 0;
    for post in &feed.posts {
        let relation = Relation::new(post.liked_by(actor), post.like_count());
        if reconciler.seed_since(&RelationKey::like(actor, &post.id), relation, epoch) {
            written += 1;
        }
    }
    for suggestion in &feed.suggestions {
        let relation = Relation::new(suggestion.is_following, suggestion.followers_count);
        if reconciler.seed_since(&RelationKey::follow(actor, &suggestion.username), relation, epoch) {
            written += 1;
        }
    }
    written
}

/// Seed the follow relation for the profile's user and like relations for
/// its posts.
pub fn seed_profile(reconciler: &Reconciler, actor: &str, view: &ProfileView, epoch: u64) -> usize {
    let mut written = 0;
    if view.summary.username != actor
        && reconciler.seed_since(
            &RelationKey::follow(actor, &view.summary.username),
            Relation::new(view.summary.is_following, view.summary.followers_count),
            epoch,
        )
    {
        written += 1;
    }
    for post in &view.posts {
        let liked = post.likers.iter().any(|u| u == actor);
        let count = u32::try_from(post.likers.len()).unwrap_or(u32::MAX);
        if reconciler.seed_since(&RelationKey::like(actor, &post.id), Relation::new(liked, count), epoch) {
            written += 1;
        }
    }
    written
}
