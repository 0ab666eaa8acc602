//! Session records and the per-key session list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::token::SessionToken;

/// One active login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Secret credential presented in the cookie.
    pub token: SessionToken,

    /// When the session was issued. Informational only.
    pub created_at: DateTime<Utc>,

    /// The session is invalid at and after this instant.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session record.
    pub fn new(token: SessionToken, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            created_at,
            expires_at,
        }
    }

    /// Whether the session is still valid at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// All sessions stored under one session key, in issue order.
///
/// Backends store and return this as a whole; it is never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionList(Vec<Session>);

impl SessionList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session.
    pub fn push(&mut self, session: Session) {
        self.0.push(session);
    }

    /// Number of sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the sessions.
    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.0.iter()
    }

    /// Keep only sessions matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&Session) -> bool) {
        self.0.retain(f);
    }

    /// Serialize to JSON, for backends that store opaque values.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON produced by [`SessionList::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Vec<Session>> for SessionList {
    fn from(sessions: Vec<Session>) -> Self {
        Self(sessions)
    }
}

impl FromIterator<Session> for SessionList {
    fn from_iter<I: IntoIterator<Item = Session>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SessionList {
    type Item = Session;
    type IntoIter = std::vec::IntoIter<Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SessionList {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The authenticated principal attached to a request.
///
/// Carries the session key and the matched session's timestamps, never the
/// token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The session key the application chose at login.
    pub key: String,

    /// When the matched session was issued.
    pub created_at: DateTime<Utc>,

    /// When the matched session expires.
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub(crate) fn from_session(key: &str, session: &Session) -> Self {
        Self {
            key: key.to_string(),
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }

    /// The session key.
    pub fn key(&self) -> &str {
        &self.key
    }
}
