use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A user reference as it appears in card payloads: either a bare id or a
/// populated user object.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Object {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Object { id } => id,
        }
    }
}

/// A card exactly as the resource API returns it.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServerCard {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub link: String,
    #[serde(default)]
    pub owner: Option<UserRef>,
    #[serde(default)]
    pub likes: Vec<UserRef>,
    #[serde(rename = "isLiked", default)]
    pub is_liked: Option<bool>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A card in the local feed.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub owner_id: String,
    pub liked_by: BTreeSet<String>,
    pub is_liked_by_current_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Builds a feed card from the server representation.
    ///
    /// The liked flag comes from the server's `isLiked` when present, then from
    /// `likes` membership of `viewer_id`, and only then from `fallback`.
    pub fn from_server(card: ServerCard, viewer_id: Option<&str>, fallback: bool) -> Self {
        let liked_by: BTreeSet<String> = card.likes.iter().map(|u| u.id().to_string()).collect();

        let is_liked_by_current_user = match (card.is_liked, viewer_id) {
            (Some(flag), _) => flag,
            (None, Some(viewer)) if !liked_by.is_empty() => liked_by.contains(viewer),
            _ => fallback,
        };

        Card {
            id: card.id,
            name: card.name,
            image_url: card.link,
            owner_id: card
                .owner
                .map(|o| o.id().to_string())
                .unwrap_or_default(),
            liked_by,
            is_liked_by_current_user,
            created_at: card.created_at,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Body of `POST /cards`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct NewCard {
    pub name: String,
    pub link: String,
}
