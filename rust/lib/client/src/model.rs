//! Domain records exchanged with the backend.
//!
//! These are the client's shapes, not the wire shapes; `http` converts the
//! GraphQL payloads into them.

use serde::{Deserialize, Serialize};

/// The authenticated user as returned by the profile query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

/// Tokens issued by login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub token: String,
    /// Present only when the server issues long-running refresh tokens.
    pub refresh_token: Option<String>,
}

/// Server answer to a toggle mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleAck {
    /// Relation state after the toggle.
    pub active: bool,
    /// Authoritative count when the server reports one.
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: String,
    pub author: Author,
    pub image: Option<String>,
    pub caption: String,
    pub created_at: String,
    /// Usernames of everyone who liked the post.
    pub likers: Vec<String>,
}

impl FeedPost {
    pub fn like_count(&self) -> u32 {
        u32::try_from(self.likers.len()).unwrap_or(u32::MAX)
    }

    pub fn liked_by(&self, username: &str) -> bool {
        self.likers.iter().any(|u| u == username)
    }
}

/// A profile card: used for follow suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub followers_count: u32,
    pub following_count: u32,
    pub is_following: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub posts: Vec<FeedPost>,
    pub suggestions: Vec<ProfileSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePost {
    pub id: String,
    pub image: Option<String>,
    pub caption: String,
    pub created_at: String,
    pub likers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub summary: ProfileSummary,
    pub location: Option<String>,
    pub date_joined: Option<String>,
    pub posts: Vec<ProfilePost>,
}

/// Account creation form. Serialized as the `create-user` request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Local checks run before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username is required.".into());
        }
        if self.password.is_empty() {
            return Err("Password is required.".into());
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match.".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SignupForm {
        SignupForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            password: "s3cret".into(),
            confirm_password: "s3cret".into(),
        }
    }

    #[test]
    fn signup_form_wire_names() {
        let json = serde_json::to_value(form()).unwrap();
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["confirmPassword"], "s3cret");
    }

    #[test]
    fn mismatched_passwords_rejected() {
        let mut f = form();
        f.confirm_password = "other".into();
        assert_eq!(f.validate().unwrap_err(), "Passwords do not match.");
        assert!(form().validate().is_ok());
    }

    #[test]
    fn feed_post_like_helpers() {
        let post = FeedPost {
            id: "p1".into(),
            author: Author {
                id: "2".into(),
                username: "bob".into(),
                display_name: "Bob".into(),
                avatar: None,
            },
            image: None,
            caption: "hi".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            likers: vec!["alice".into(), "carol".into()],
        };
        assert_eq!(post.like_count(), 2);
        assert!(post.liked_by("alice"));
        assert!(!post.liked_by("bob"));
    }
}
