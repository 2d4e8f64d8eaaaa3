use serde::{Deserialize, Serialize};

/// Session behaviour knobs. Loaded from the `[session]` table of the client
/// config; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Login entry point the guard redirects to.
    pub login_path: String,

    /// Where login and signup land when no callback URL was given.
    pub home_path: String,

    /// Seconds a notice stays in `notice/list` before `prune` drops it.
    pub notice_ttl_secs: u64,

    /// Authorization header scheme for API requests.
    pub auth_scheme: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".into(),
            home_path: "/feed".into(),
            notice_ttl_secs: 5,
            auth_scheme: "JWT".into(),
        }
    }
}

impl SessionConfig {
    /// Login URL carrying `callbackUrl` for the page the user was on.
    pub fn login_redirect(&self, current_url: &str) -> String {
        if current_url.is_empty() {
            return self.login_path.clone();
        }
        format!(
            "{}?callbackUrl={}",
            self.login_path,
            urlencoding::encode(current_url)
        )
    }

    /// Post-login target: the callback if one was provided, else home.
    pub fn landing(&self, callback_url: Option<&str>) -> String {
        match callback_url {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.home_path.clone(),
        }
    }
}
