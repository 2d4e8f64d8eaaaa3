//! Profile pages, stored at `profile/{username}`.

use flux_derive::state;
use serde::{Deserialize, Serialize};
use socialbook_client::ProfileView;

#[state("profile")]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ProfileView>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfilePage {
    pub fn path_for(username: &str) -> String {
        format!("{}/{}", Self::PATH, username)
    }
}
