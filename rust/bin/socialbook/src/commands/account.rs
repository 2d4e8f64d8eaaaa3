//! Login, signup, logout and whoami.

use anyhow::Result;
use socialbook_client::SignupForm;
use socialbook_social::request::{LoginReq, LogoutReq, SignupReq};
use socialbook_social::state::{AuthPhase, AuthState, FeedState};
use socialbook_social::GuardOutcome;

use super::App;

pub async fn login(app: &App, username: &str, password: &str) -> Result<()> {
    app.flux
        .emit(
            LoginReq::PATH,
            LoginReq {
                username: username.to_string(),
                password: password.to_string(),
                callback_url: None,
            },
        )
        .await;
    report_session(app, username)
}

pub async fn signup(app: &App, form: SignupForm) -> Result<()> {
    let username = form.username.clone();
    app.flux
        .emit(SignupReq::PATH, SignupReq { form, callback_url: None })
        .await;
    report_session(app, &username)
}

fn report_session(app: &App, username: &str) -> Result<()> {
    app.drain_notices();
    let auth = app.flux.read::<AuthState>(AuthState::PATH).unwrap_or_default();
    let identity = match auth.identity {
        Some(identity) if auth.phase == AuthPhase::Authenticated => identity,
        _ => anyhow::bail!("Login failed for {}.", username),
    };
    println!("Logged in as {} (@{}).", identity.display_name, identity.username);
    if let Some(feed) = app.flux.read::<FeedState>(FeedState::PATH) {
        println!("{} posts in your feed.", feed.posts.len());
    }
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.flux.emit(LogoutReq::PATH, LogoutReq).await;
    println!("Logged out.");
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    match app.ctx.session.check("/").await {
        GuardOutcome::Authenticated(identity) => {
            println!("{} (@{})", identity.display_name, identity.username);
            if let Some(avatar) = identity.avatar {
                println!("avatar: {}", avatar);
            }
        }
        GuardOutcome::Redirected(target) => {
            println!("Not logged in (redirect: {}).", target);
        }
    }
    Ok(())
}
