//! The session controller: startup validation, sign-in/up/out and card mutations.
//!
//! All operations take `&mut self`, so a controller processes one operation at
//! a time. Local state only changes after the server confirms; a rejected
//! request is logged and leaves the state as it was.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::notification::Notification;
use super::route::Route;
use super::state::{AuthenticatedSession, SessionState};
use crate::api::ApiClient;
use crate::auth::{AuthService, Credentials, Identity};
use crate::config::ConfigV1;
use crate::error::ClientError;
use crate::models::{Card, NewCard};
use crate::store::{create_store, TokenStore};

pub struct SessionController {
    /// Unauthenticated template; authenticated copies live in the session.
    pub(super) api: ApiClient,
    pub(super) auth: AuthService,
    pub(super) store: Arc<dyn TokenStore>,
    pub(super) state: SessionState,
    pub(super) route: Route,
    pub(super) notification: Option<Notification>,
}

impl SessionController {
    /// Builds the clients and the token store described by the configuration.
    pub fn new(config: &ConfigV1) -> Result<Self, ClientError> {
        let api = ApiClient::new(&config.api)?;
        let auth = AuthService::new(&config.auth)?;
        let store = create_store(&config.store);
        Ok(Self::from_parts(api, auth, store))
    }

    pub fn from_parts(api: ApiClient, auth: AuthService, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api: api.without_token(),
            auth,
            store,
            state: SessionState::Initializing,
            route: Route::SignIn,
            notification: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Navigate to `path`, applying the route guards.
    pub fn navigate(&mut self, path: &str) -> Route {
        self.route = Route::resolve(path, self.is_authenticated());
        self.route
    }

    /// The cards of the current session; empty when signed out.
    pub fn cards(&self) -> &[Card] {
        match &self.state {
            SessionState::Authenticated(session) => session.cards(),
            _ => &[],
        }
    }

    /// The token of the current session.
    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session.token()),
            _ => None,
        }
    }

    /// The last sign-in/sign-up notification, consumed on read.
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub(super) fn session(&self) -> Result<&AuthenticatedSession, ClientError> {
        match &self.state {
            SessionState::Authenticated(session) => Ok(session),
            _ => Err(ClientError::NotAuthenticated),
        }
    }

    pub(super) fn session_mut(&mut self) -> Result<&mut AuthenticatedSession, ClientError> {
        match &mut self.state {
            SessionState::Authenticated(session) => Ok(session),
            _ => Err(ClientError::NotAuthenticated),
        }
    }

    fn become_unauthenticated(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.route = Route::SignIn;
    }

    fn become_authenticated(&mut self, session: AuthenticatedSession) {
        info!(
            user_id = session.profile().id.as_str(),
            cards = session.cards().len(),
            "Session established"
        );
        self.state = SessionState::Authenticated(session);
        self.route = Route::Home;
    }

    /// Fetches profile and cards with `token`, concurrently. Both must succeed.
    /// `account_email` backs up a profile served without one.
    async fn open_session(
        &self,
        token: String,
        account_email: &str,
    ) -> Result<AuthenticatedSession, ClientError> {
        let api = self.api.with_token(&token);
        let (mut profile, server_cards) =
            futures::try_join!(api.get_user_info(), api.get_initial_cards())?;
        profile.fill_email(account_email);

        let viewer = profile.id.clone();
        let cards = server_cards
            .into_iter()
            .map(|card| Card::from_server(card, Some(&viewer), false))
            .collect();

        Ok(AuthenticatedSession::new(&self.api, token, profile, cards))
    }

    /// Restores the persisted session, if any.
    ///
    /// No token routes to sign-in. A token that fails validation is removed
    /// from the store. A valid token whose profile or cards cannot be loaded
    /// stays persisted so the next start can try again, but the session is not
    /// entered: there is no signed-in state without a profile and a feed.
    pub async fn initialize(&mut self) {
        self.state = SessionState::Initializing;
        debug!(store = self.store.get_name(), "Restoring session");

        let token = match self.store.load().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted token; routing to sign-in");
                self.become_unauthenticated();
                return;
            }
            Err(e) => {
                error!("Could not read persisted token: {}", e);
                self.become_unauthenticated();
                return;
            }
        };

        let identity = match self.auth.check_token(&token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Persisted token is no longer valid: {}", e);
                if let Err(e) = self.store.clear().await {
                    error!("Could not clear invalid token: {}", e);
                }
                self.become_unauthenticated();
                return;
            }
        };

        match self.open_session(token, &identity.email).await {
            Ok(session) => self.become_authenticated(session),
            Err(e) => {
                error!("Token is valid but the session could not be loaded: {}", e);
                self.become_unauthenticated();
            }
        }
    }

    async fn establish(&self, credentials: &Credentials) -> Result<AuthenticatedSession, ClientError> {
        let response = self
            .auth
            .login(&credentials.password, &credentials.email)
            .await?;
        let token = response.token.ok_or(ClientError::MissingToken)?;
        let session = self.open_session(token, &credentials.email).await?;
        self.store.save(session.token()).await?;
        Ok(session)
    }

    /// Signs in, loads the feed and persists the token.
    ///
    /// On any failure nothing is persisted, a failure notification is raised
    /// and the state is left untouched.
    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<(), ClientError> {
        match self.establish(credentials).await {
            Ok(session) => {
                self.notification = None;
                self.become_authenticated(session);
                Ok(())
            }
            Err(e) => {
                warn!(email = credentials.email.as_str(), "Sign-in failed: {}", e);
                self.notification = Some(Notification::failure(e.user_message()));
                Err(e)
            }
        }
    }

    /// Registers an account. Never changes the authentication state.
    pub async fn sign_up(&mut self, credentials: &Credentials) -> Result<Identity, ClientError> {
        match self
            .auth
            .register(&credentials.password, &credentials.email)
            .await
        {
            Ok(identity) => {
                info!(email = identity.email.as_str(), "Registration succeeded");
                self.notification = Some(Notification::success());
                self.route = Route::resolve(Route::SignIn.path(), self.is_authenticated());
                Ok(identity)
            }
            Err(e) => {
                warn!(email = credentials.email.as_str(), "Registration failed: {}", e);
                self.notification = Some(Notification::failure(e.user_message()));
                Err(e)
            }
        }
    }

    /// Ends the session locally. Safe to call at any time.
    pub async fn sign_out(&mut self) {
        if let Err(e) = self.store.clear().await {
            error!("Could not clear persisted token: {}", e);
        }
        if self.is_authenticated() {
            info!("Signed out");
        }
        self.become_unauthenticated();
    }

    /// Likes an unliked card or unlikes a liked one, then merges the server's card.
    pub async fn toggle_like(&mut self, card_id: &str) -> Result<(), ClientError> {
        let (api, viewer, like) = {
            let session = self.session()?;
            let card = session
                .find_card(card_id)
                .ok_or_else(|| ClientError::CardNotFound(card_id.to_string()))?;
            (
                session.api().clone(),
                session.profile().id.clone(),
                !card.is_liked_by_current_user,
            )
        };

        let server_card = api.change_like_status(card_id, like).await.map_err(|e| {
            warn!(card_id, like, "Like change failed: {}", e);
            e
        })?;

        let updated = Card::from_server(server_card, Some(&viewer), like);
        if !self.session_mut()?.replace_card(card_id, updated) {
            debug!(card_id, "Card left the list while the like was in flight");
        }
        Ok(())
    }

    /// Deletes a card on the server, then drops it from the list.
    pub async fn delete_card(&mut self, card_id: &str) -> Result<(), ClientError> {
        let api = self.session()?.api().clone();
        api.delete_card(card_id).await.map_err(|e| {
            warn!(card_id, "Card deletion failed: {}", e);
            e
        })?;
        self.session_mut()?.remove_card(card_id);
        debug!(card_id, "Card deleted");
        Ok(())
    }

    /// Creates a card on the server and puts it first in the list.
    pub async fn add_card(&mut self, card: &NewCard) -> Result<&Card, ClientError> {
        let api = self.session()?.api().clone();
        let server_card = api.create_card(card).await.map_err(|e| {
            warn!(name = card.name.as_str(), "Card creation failed: {}", e);
            e
        })?;

        let mut created = Card::from_server(server_card, None, false);
        created.is_liked_by_current_user = false;

        let session = self.session_mut()?;
        session.prepend_card(created);
        debug!(card_id = session.cards[0].id.as_str(), "Card created");
        Ok(&session.cards[0])
    }
}
