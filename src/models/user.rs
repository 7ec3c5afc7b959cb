use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_NAME: &str = "Usuario";
const DEFAULT_ABOUT: &str = "Explorador";
const DEFAULT_AVATAR: &str = "https://via.placeholder.com/120";

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_about() -> String {
    DEFAULT_ABOUT.to_string()
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

/// The signed-in user's profile as served by `/users/me`.
///
/// Some backends only return `{ _id, email }`, so display fields fall back to
/// placeholder values instead of failing to decode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_about")]
    pub about: String,
    #[serde(rename = "avatar", default = "default_avatar")]
    pub avatar_url: String,
}

impl UserProfile {
    /// Profile edit responses omit the email; keep the one we already had.
    pub fn inherit_missing(&mut self, previous: &UserProfile) {
        if self.email.is_empty() {
            self.email = previous.email.clone();
        }
        if self.id.is_empty() {
            self.id = previous.id.clone();
        }
    }

    /// `/users/me` on the resource API may leave out the email. The auth API
    /// (or the sign-in form) always knows it.
    pub fn fill_email(&mut self, email: &str) {
        if self.email.is_empty() && !email.is_empty() {
            self.email = email.to_string();
        }
    }
}

/// Body of `PATCH /users/me`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ProfileUpdate {
    pub name: String,
    pub about: String,
}

/// Body of `PATCH /users/me/avatar`.
#[derive(Serialize, Debug, Clone)]
pub(crate) struct AvatarUpdate<'a> {
    pub avatar: &'a str,
}
