use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::configuration::random_hex_token;

/// How long an admin session stays valid after login.
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// A logged-in admin session. Opaque to callers besides its token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    created_at: Instant,
    expires_at: Instant,
}

impl Session {
    fn new() -> Self {
        let created_at = Instant::now();
        Self {
            token: random_hex_token(32),
            created_at,
            expires_at: created_at + SESSION_TTL,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process store of live admin sessions, keyed by token.
///
/// Expiry is purged opportunistically on validation rather than via a background
/// sweep, since the admin surface sees low and bursty traffic.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new session and return its token.
    pub fn create(&self) -> Session {
        let session = Session::new();
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Validate `token`, purging it if expired. Returns whether it is currently live.
    pub fn validate(&self, token: &str) -> bool {
        let now = Instant::now();
        match self.sessions.get(token) {
            Some(session) if !session.is_expired(now) => true,
            Some(_) => {
                drop(self.sessions.remove(token));
                false
            }
            None => false,
        }
    }

    /// Drop every live session, e.g. after the admin password changes.
    pub fn clear(&self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshly_created_session_validates() {
        let store = SessionStore::new();
        let session = store.create();
        assert!(store.validate(&session.token));
    }

    #[test]
    fn unknown_token_does_not_validate() {
        let store = SessionStore::new();
        assert!(!store.validate("deadbeef"));
    }

    #[test]
    fn clear_invalidates_all_sessions() {
        let store = SessionStore::new();
        let session = store.create();
        store.clear();
        assert!(!store.validate(&session.token));
    }

    #[test]
    fn expired_session_is_purged_on_validate() {
        let store = SessionStore::new();
        let mut session = Session::new();
        session.expires_at = Instant::now() - Duration::from_secs(1);
        store.sessions.insert(session.token.clone(), session.clone());

        assert!(!store.validate(&session.token));
        assert!(store.sessions.get(&session.token).is_none());
    }
}
