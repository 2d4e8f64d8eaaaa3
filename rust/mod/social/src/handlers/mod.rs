//! Request handlers and Flux wiring.
//!
//! `register_handlers` binds each request path to its handler: the payload
//! is downcast to the request type and the handler runs with the shared
//! [`AppContext`].

pub mod app;
pub mod auth;
pub mod feed;
pub mod helpers;
pub mod post;
pub mod user;

use std::sync::Arc;

use socialbook_client::{SessionApi, SocialApi};
use socialbook_flux::{Flux, StateStore};
use tracing::warn;

use crate::config::SessionConfig;
use crate::credential::CredentialStore;
use crate::navigator::{Navigator, StateNavigator};
use crate::notifier::NoticeBoard;
use crate::reconciler::Reconciler;
use crate::request::*;
use crate::session::{IdentityContext, SessionManager};

/// Services shared by all handlers.
pub struct AppContext {
    pub session: SessionManager,
    pub reconciler: Reconciler,
    pub social: Arc<dyn SocialApi>,
    pub notices: Arc<NoticeBoard>,
    pub identity: IdentityContext,
}

impl AppContext {
    /// Wire the services over `store`, navigating through `app/route`.
    pub fn new(
        store: Arc<StateStore>,
        credentials: CredentialStore,
        session_api: Arc<dyn SessionApi>,
        social_api: Arc<dyn SocialApi>,
        config: SessionConfig,
    ) -> Self {
        let navigator = Arc::new(StateNavigator::new(store.clone()));
        Self::with_navigator(store, credentials, session_api, social_api, navigator, config)
    }

    pub fn with_navigator(
        store: Arc<StateStore>,
        credentials: CredentialStore,
        session_api: Arc<dyn SessionApi>,
        social_api: Arc<dyn SocialApi>,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        let notices = Arc::new(NoticeBoard::new(store.clone(), config.notice_ttl_secs));
        let session = SessionManager::new(
            credentials,
            session_api,
            navigator,
            notices.clone(),
            store.clone(),
            config,
        );
        let reconciler = Reconciler::new(social_api.clone(), store.clone(), notices.clone());
        Self {
            session,
            reconciler,
            social: social_api,
            notices,
            identity: IdentityContext::new(store),
        }
    }
}

/// Register all handlers with a Flux instance.
pub fn register_handlers(flux: &Flux, ctx: Arc<AppContext>) {
    // app/initialize
    {
        let ctx = ctx.clone();
        flux.on(InitializeReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<InitializeReq>() else {
                    return payload_mismatch(&path);
                };
                app::handle_initialize(req, &store, &ctx).await;
            }
        });
    }

    // auth/check
    {
        let ctx = ctx.clone();
        flux.on(CheckSessionReq::PATH, move |path, payload, _| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<CheckSessionReq>() else {
                    return payload_mismatch(&path);
                };
                auth::handle_check(req, &ctx).await;
            }
        });
    }

    // auth/login
    {
        let ctx = ctx.clone();
        flux.on(LoginReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<LoginReq>() else {
                    return payload_mismatch(&path);
                };
                // Load the feed once the session is up.
                if auth::handle_login(req, &ctx).await {
                    feed::handle_feed_load(&store, &ctx).await;
                }
            }
        });
    }

    // auth/signup
    {
        let ctx = ctx.clone();
        flux.on(SignupReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<SignupReq>() else {
                    return payload_mismatch(&path);
                };
                if auth::handle_signup(req, &ctx).await {
                    feed::handle_feed_load(&store, &ctx).await;
                }
            }
        });
    }

    // auth/logout
    {
        let ctx = ctx.clone();
        flux.on(LogoutReq::PATH, move |_, _, _| {
            let ctx = ctx.clone();
            async move {
                auth::handle_logout(&ctx).await;
            }
        });
    }

    // feed/load
    {
        let ctx = ctx.clone();
        flux.on(FeedLoadReq::PATH, move |_, _, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                feed::handle_feed_load(&store, &ctx).await;
            }
        });
    }

    // profile/load
    {
        let ctx = ctx.clone();
        flux.on(LoadProfileReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<LoadProfileReq>() else {
                    return payload_mismatch(&path);
                };
                feed::handle_load_profile(req, &store, &ctx).await;
            }
        });
    }

    // post/toggle-like
    {
        let ctx = ctx.clone();
        flux.on(ToggleLikeReq::PATH, move |path, payload, _| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<ToggleLikeReq>() else {
                    return payload_mismatch(&path);
                };
                post::handle_toggle_like(req, &ctx).await;
            }
        });
    }

    // post/create
    {
        let ctx = ctx.clone();
        flux.on(CreatePostReq::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<CreatePostReq>() else {
                    return payload_mismatch(&path);
                };
                // Failures are already reported as notices.
                let _ = post::handle_create_post(req, &store, &ctx).await;
            }
        });
    }

    // user/toggle-follow
    {
        let ctx = ctx.clone();
        flux.on(ToggleFollowReq::PATH, move |path, payload, _| {
            let ctx = ctx.clone();
            async move {
                let Some(req) = payload.downcast_ref::<ToggleFollowReq>() else {
                    return payload_mismatch(&path);
                };
                user::handle_toggle_follow(req, &ctx).await;
            }
        });
    }

    // notice/dismiss
    flux.on(DismissNoticeReq::PATH, move |path, payload, _| {
        let ctx = ctx.clone();
        async move {
            let Some(req) = payload.downcast_ref::<DismissNoticeReq>() else {
                return payload_mismatch(&path);
            };
            app::handle_dismiss_notice(req, &ctx).await;
        }
    });
}

fn payload_mismatch(path: &str) {
    warn!(path, "request payload has the wrong type");
}
