//! `socialbook feed`.

use anyhow::Result;
use socialbook_social::request::FeedLoadReq;
use socialbook_social::state::{FeedState, RelationKey, RelationState};

use super::App;

pub async fn show(app: &App) -> Result<()> {
    let actor = app.require_session("/feed").await?;
    app.flux.emit(FeedLoadReq::PATH, FeedLoadReq).await;
    app.drain_notices();

    let feed = app.flux.read::<FeedState>(FeedState::PATH).unwrap_or_default();
    if let Some(err) = feed.error {
        anyhow::bail!("Could not load feed: {}", err);
    }

    if feed.posts.is_empty() {
        println!("Your feed is empty. Follow someone below.");
    }
    for post in &feed.posts {
        let like = app
            .flux
            .read::<RelationState>(&RelationKey::like(&actor, &post.id).path())
            .map(|s| s.relation)
            .unwrap_or_default();
        let heart = if like.active { "♥" } else { "♡" };
        println!("{}  @{}  {}", post.id, post.author.username, post.created_at);
        if !post.caption.is_empty() {
            println!("    {}", post.caption);
        }
        println!("    {} {}", heart, like.count);
    }

    if !feed.suggestions.is_empty() {
        println!();
        println!("Who to follow:");
        for s in &feed.suggestions {
            println!(
                "    @{:<16} {:<24} {} followers",
                s.username, s.display_name, s.followers_count
            );
        }
    }
    Ok(())
}
