//! Signed-in session context: the API token and the user's profile.

use tokio::sync::watch;

use super::models::{User, DEFAULT_FIAT_CURRENCY};

/// Holds the access token and profile of the current session.
///
/// Both live in `watch` channels so that a presentation layer can react to a
/// sign-out (the token being cleared after a 401) or a currency change.
#[derive(Debug)]
pub struct Session {
    token: watch::Sender<Option<String>>,
    profile: watch::Sender<Option<User>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let (token, _) = watch::channel(token);
        let (profile, _) = watch::channel(None);
        Self { token, profile }
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.token.send_replace(Some(token.into()));
    }

    /// Drop the token. Subsequent remote calls fail fast until a new one is set.
    pub fn clear_token(&self) {
        if self.token.send_replace(None).is_some() {
            tracing::warn!("Session token cleared");
        }
    }

    /// Drop the token only if it is still `expected`, leaving a token set
    /// in the meantime untouched. Returns whether the token was cleared.
    pub fn clear_token_if(&self, expected: &str) -> bool {
        let cleared = self.token.send_if_modified(|token| {
            if token.as_deref() == Some(expected) {
                *token = None;
                true
            } else {
                false
            }
        });
        if cleared {
            tracing::warn!("Session token cleared");
        }
        cleared
    }

    pub fn subscribe_token(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }

    pub fn profile(&self) -> Option<User> {
        self.profile.borrow().clone()
    }

    pub fn set_profile(&self, user: User) {
        self.profile.send_replace(Some(user));
    }

    pub fn subscribe_profile(&self) -> watch::Receiver<Option<User>> {
        self.profile.subscribe()
    }

    /// Currency every fiat-joined read uses
    pub fn fiat_currency(&self) -> String {
        self.profile
            .borrow()
            .as_ref()
            .and_then(|user| user.fiat_currency.clone())
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| DEFAULT_FIAT_CURRENCY.to_string())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(None)
    }
}
