//! Admin session credential.
//!
//! The [`Session`] is shared (`Arc`) between the API client, which attaches
//! and invalidates the token, and the UI, which logs in and out. Consumers
//! that must react to a rejected credential subscribe with
//! [`Session::subscribe_invalidations`].

use std::fmt;

use tokio::sync::watch;

/// An admin token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminToken(String);

impl AdminToken {
    /// Build a token from user input; blank input yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// The raw value, for the request header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminToken(****)")
    }
}

/// Holder of the current admin credential.
#[derive(Debug)]
pub struct Session {
    token: watch::Sender<Option<AdminToken>>,
    /// Bumped once per credential rejected by the server.
    invalidations: watch::Sender<u64>,
}

impl Session {
    #[must_use]
    pub fn new(token: Option<AdminToken>) -> Self {
        Self {
            token: watch::Sender::new(token),
            invalidations: watch::Sender::new(0),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub fn get(&self) -> Option<AdminToken> {
        self.token.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn set(&self, token: AdminToken) {
        self.token.send_replace(Some(token));
    }

    /// Forget the credential (logout). Does not count as an invalidation.
    pub fn clear(&self) -> bool {
        self.token.send_if_modified(|slot| slot.take().is_some())
    }

    /// Drop a credential the server rejected and notify subscribers.
    ///
    /// Only the call that actually removes a token publishes; concurrent
    /// rejections of the same token collapse into one notification.
    pub fn invalidate(&self) -> bool {
        let cleared = self.token.send_if_modified(|slot| slot.take().is_some());
        if cleared {
            self.invalidations.send_modify(|count| *count += 1);
            tracing::warn!("Admin session invalidated");
        }
        cleared
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AdminToken>> {
        self.token.subscribe()
    }

    #[must_use]
    pub fn subscribe_invalidations(&self) -> watch::Receiver<u64> {
        self.invalidations.subscribe()
    }

    #[must_use]
    pub fn invalidation_count(&self) -> u64 {
        *self.invalidations.borrow()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}
