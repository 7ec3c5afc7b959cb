//! The current user's profile: a read-only view plus the operations that edit it.
//!
//! The profile is owned by the authenticated session; edits replace it there,
//! so every view sees the same value without any callback plumbing.

use tracing::{debug, warn};

use super::controller::SessionController;
use super::state::SessionState;
use crate::error::ClientError;
use crate::models::{ProfileUpdate, UserProfile};

/// Borrowed view of the signed-in user.
#[derive(Debug, Clone, Copy)]
pub struct UserContext<'a> {
    profile: Option<&'a UserProfile>,
}

impl<'a> UserContext<'a> {
    pub fn current_user(&self) -> Option<&'a UserProfile> {
        self.profile
    }

    pub fn is_signed_in(&self) -> bool {
        self.profile.is_some()
    }

    /// Shown in the header next to the sign-out action.
    pub fn email(&self) -> Option<&'a str> {
        self.profile.map(|p| p.email.as_str())
    }
}

impl SessionController {
    pub fn user_context(&self) -> UserContext<'_> {
        let profile = match &self.state {
            SessionState::Authenticated(session) => Some(session.profile()),
            _ => None,
        };
        UserContext { profile }
    }

    fn store_profile(&mut self, mut profile: UserProfile) -> Result<(), ClientError> {
        let session = self.session_mut()?;
        profile.inherit_missing(&session.profile);
        debug!(user_id = profile.id.as_str(), "Profile replaced");
        session.profile = profile;
        Ok(())
    }

    /// Re-fetches the profile from the server.
    pub async fn refresh_user(&mut self) -> Result<(), ClientError> {
        let api = self.session()?.api().clone();
        let profile = api.get_user_info().await.map_err(|e| {
            warn!("Could not fetch user information: {}", e);
            e
        })?;
        self.store_profile(profile)
    }

    /// Edits name and about.
    pub async fn update_user(&mut self, update: &ProfileUpdate) -> Result<(), ClientError> {
        let api = self.session()?.api().clone();
        let profile = api.update_user_profile(update).await.map_err(|e| {
            warn!("Could not update user information: {}", e);
            e
        })?;
        self.store_profile(profile)
    }

    /// Points the avatar at a new image URL.
    pub async fn update_avatar(&mut self, avatar_url: &str) -> Result<(), ClientError> {
        let api = self.session()?.api().clone();
        let profile = api.update_avatar(avatar_url).await.map_err(|e| {
            warn!("Could not update avatar: {}", e);
            e
        })?;
        self.store_profile(profile)
    }
}
