//! Auth handlers.

use tracing::warn;

use crate::handlers::AppContext;
use crate::request::*;

/// Handle `auth/check`.
pub async fn handle_check(req: &CheckSessionReq, ctx: &AppContext) {
    ctx.session.check(&req.current_url).await;
}

/// Handle `auth/login`. Returns true when a session was established.
pub async fn handle_login(req: &LoginReq, ctx: &AppContext) -> bool {
    ctx.session
        .login(&req.username, &req.password, req.callback_url.as_deref())
        .await
        .is_ok()
}

/// Handle `auth/signup`. Returns true when a session was established.
pub async fn handle_signup(req: &SignupReq, ctx: &AppContext) -> bool {
    ctx.session
        .signup(&req.form, req.callback_url.as_deref())
        .await
        .is_ok()
}

/// Handle `auth/logout`.
pub async fn handle_logout(ctx: &AppContext) {
    if let Err(e) = ctx.session.logout() {
        warn!(error = %e, "logout could not clear the stored credential");
    }
}
