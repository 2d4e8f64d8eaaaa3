//! `socialbook like` / `socialbook follow` / `socialbook post`.

use anyhow::Result;
use socialbook_social::handlers::{post, user};
use socialbook_social::request::{
    CreatePostReq, FeedLoadReq, LoadProfileReq, ToggleFollowReq, ToggleLikeReq,
};
use socialbook_social::ToggleOutcome;

use super::App;

pub async fn like(app: &App, post_id: &str) -> Result<()> {
    app.require_session("/feed").await?;
    // Seed the current like state so the toggle starts from the truth. Posts
    // outside the feed start unseeded; likePost reports the full likes list,
    // so their count still settles to the server's.
    app.flux.emit(FeedLoadReq::PATH, FeedLoadReq).await;

    let req = ToggleLikeReq { post_id: post_id.to_string() };
    let outcome = post::handle_toggle_like(&req, &app.ctx).await;
    report(app, outcome, |active| if active { "Liked" } else { "Unliked" }, "likes")
}

pub async fn follow(app: &App, username: &str) -> Result<()> {
    app.require_session(&format!("/profile/{}", username)).await?;
    // followUser reports no count, so the follower count comes from here.
    app.flux
        .emit(
            LoadProfileReq::PATH,
            LoadProfileReq { username: username.to_string() },
        )
        .await;

    let req = ToggleFollowReq { username: username.to_string() };
    let outcome = user::handle_toggle_follow(&req, &app.ctx).await;
    report(
        app,
        outcome,
        |active| if active { "Following" } else { "Unfollowed" },
        "followers",
    )
}

pub async fn create(app: &App, image: &str, caption: &str) -> Result<()> {
    app.require_session("/feed").await?;
    let req = CreatePostReq { image: image.to_string(), caption: caption.to_string() };
    let result = post::handle_create_post(&req, app.flux.store(), &app.ctx).await;
    app.drain_notices();
    let post = result.map_err(|e| anyhow::anyhow!("Not posted: {}", e.message()))?;
    println!("Posted {}.", post.id);
    Ok(())
}

fn report(
    app: &App,
    outcome: Option<ToggleOutcome>,
    verb: impl Fn(bool) -> &'static str,
    unit: &str,
) -> Result<()> {
    app.drain_notices();
    match outcome {
        Some(ToggleOutcome::Confirmed(relation)) => {
            println!("{} ({} {}).", verb(relation.active), relation.count, unit);
            Ok(())
        }
        Some(ToggleOutcome::RolledBack { error, .. }) => {
            anyhow::bail!("Not changed: {}", error.message())
        }
        Some(ToggleOutcome::Deduplicated) => {
            println!("Already in progress.");
            Ok(())
        }
        None => anyhow::bail!("Nothing to toggle."),
    }
}
