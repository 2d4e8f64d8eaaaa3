//! Auth requests.

use flux_derive::request;
use socialbook_client::SignupForm;

/// Re-run the session guard for the page at `current_url`.
#[request("auth/check")]
pub struct CheckSessionReq {
    pub current_url: String,
}

#[request("auth/login")]
pub struct LoginReq {
    pub username: String,
    pub password: String,
    /// Where to go afterwards; home when absent.
    pub callback_url: Option<String>,
}

#[request("auth/signup")]
pub struct SignupReq {
    pub form: SignupForm,
    pub callback_url: Option<String>,
}

/// Logout: clear the session.
#[request("auth/logout")]
pub struct LogoutReq;
