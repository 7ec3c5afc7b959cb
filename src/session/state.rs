use crate::api::ApiClient;
use crate::models::{Card, UserProfile};

/// Where the session stands.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Startup has not finished validating the persisted token.
    Initializing,
    Unauthenticated,
    Authenticated(AuthenticatedSession),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Initializing => "initializing",
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated(_) => "authenticated",
        }
    }
}

/// Everything that only exists while signed in. The API client is bound to
/// `token`, and both are dropped together on sign-out.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    token: String,
    api: ApiClient,
    pub(crate) profile: UserProfile,
    pub(crate) cards: Vec<Card>,
}

impl AuthenticatedSession {
    pub(crate) fn new(api: &ApiClient, token: String, profile: UserProfile, cards: Vec<Card>) -> Self {
        Self {
            api: api.with_token(&token),
            token,
            profile,
            cards,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    /// Swap the card with `card_id` in place. Returns false if it is gone.
    pub(crate) fn replace_card(&mut self, card_id: &str, card: Card) -> bool {
        match self.cards.iter_mut().find(|c| c.id == card_id) {
            Some(slot) => {
                *slot = card;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove_card(&mut self, card_id: &str) {
        self.cards.retain(|c| c.id != card_id);
    }

    pub(crate) fn prepend_card(&mut self, card: Card) {
        self.cards.insert(0, card);
    }
}
