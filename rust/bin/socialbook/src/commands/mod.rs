//! Subcommand implementations.
//!
//! Every command drives the same Flux core a UI would: it emits requests
//! and prints what lands in the state tree.

pub mod account;
pub mod feed;
pub mod social;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use socialbook_client::HttpApi;
use socialbook_flux::Flux;
use socialbook_kv::RedbStore;
use socialbook_social::request::CheckSessionReq;
use socialbook_social::state::NoticeList;
use socialbook_social::{register_handlers, AppContext, CredentialStore};
use tracing::debug;

use crate::config::ClientConfig;

/// The wired client core.
pub struct App {
    pub flux: Flux,
    pub ctx: Arc<AppContext>,
}

impl App {
    pub fn open(config: &ClientConfig) -> Result<Self> {
        let storage = config.storage_path();
        let kv = RedbStore::open(&storage)
            .with_context(|| format!("opening token storage at {}", storage.display()))?;
        let credentials = CredentialStore::new(Arc::new(kv));
        let api = Arc::new(
            HttpApi::new(&config.api_url, Arc::new(credentials.clone()))
                .with_scheme(config.session.auth_scheme.clone()),
        );
        debug!(api_url = %config.api_url, "client core ready");

        let flux = Flux::new();
        let ctx = Arc::new(AppContext::new(
            flux.store().clone(),
            credentials,
            api.clone(),
            api,
            config.session.clone(),
        ));
        register_handlers(&flux, ctx.clone());
        Ok(Self { flux, ctx })
    }

    /// Run the session guard; fail with a hint if it redirected to login.
    pub async fn require_session(&self, current_url: &str) -> Result<String> {
        self.flux
            .emit(
                CheckSessionReq::PATH,
                CheckSessionReq { current_url: current_url.to_string() },
            )
            .await;
        match self.ctx.identity.actor() {
            Some(actor) => Ok(actor),
            None => anyhow::bail!("Not logged in. Run `socialbook login`."),
        }
    }

    /// Print and drop every pending notice.
    pub fn drain_notices(&self) {
        let Some(list) = self.flux.read::<NoticeList>(NoticeList::PATH) else {
            return;
        };
        for notice in &list.items {
            eprintln!("{}: {}", notice.title, notice.message);
            self.ctx.notices.dismiss(notice.id);
        }
    }
}
