//! Session issuance, revocation and validation.
//!
//! Every mutation is an unsynchronized read-modify-write of the key's whole
//! list: read, prune expired entries, change, write back. There is no
//! locking or versioning, so two concurrent writers for the same key race
//! and the last write wins. Different keys never interfere.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tracing::{debug, trace, warn};

use crate::codec::{self, ResponseSink};
use crate::config::SessionConfig;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::prune::prune;
use crate::session::{Identity, Session, SessionList};
use crate::store::SessionStore;
use crate::token::SessionToken;

/// Issues, revokes and validates cookie-bound sessions.
///
/// Cheap to clone; clones share configuration and store.
#[derive(Debug, Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    store: Arc<dyn SessionStore>,
    ttl: TimeDelta,
}

impl SessionManager {
    /// Create a manager over `store`.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: SessionConfig, store: impl SessionStore + 'static) -> Result<Self> {
        Self::from_shared(Arc::new(config), Arc::new(store))
    }

    /// Create a manager from an already shared configuration and store.
    pub fn from_shared(config: Arc<SessionConfig>, store: Arc<dyn SessionStore>) -> Result<Self> {
        config.validate()?;
        let ttl = TimeDelta::from_std(config.ttl)
            .map_err(|e| Error::Config(format!("invalid ttl: {}", e)))?;
        Ok(Self { config, store, ttl })
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Log `key` in: issue a new session and write its cookie to `sink`.
    ///
    /// Other sessions under the same key stay valid, so one principal can be
    /// logged in from several devices. Expired sessions for the key are
    /// dropped as part of the same write.
    pub async fn set<S>(&self, ctx: &RequestContext, sink: &mut S, key: &str) -> Result<Identity>
    where
        S: ResponseSink + ?Sized,
    {
        let token = SessionToken::generate()?;
        let value = codec::encode(key, &token)?;
        // Nothing may reach the store unless the cookie can be delivered
        let cookie = codec::session_cookie(&self.config, value);
        codec::header_value(&cookie)?;

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Config("ttl overflows the session expiry".to_string()))?;
        let session = Session::new(token, now, expires_at);
        let identity = Identity::from_session(key, &session);

        let mut sessions = ctx.run(self.store.read(key)).await?;
        let pruned = sessions.prune_expired(now);
        sessions.push(session);
        ctx.run(self.store.write(key, &sessions)).await?;

        sink.set_cookie(cookie)?;

        debug!(key, active = sessions.len(), pruned, "Session issued");
        Ok(identity)
    }

    /// Revoke every session stored under `key`.
    ///
    /// Cookies already handed out for the key stop validating on their next
    /// request.
    pub async fn clear(&self, ctx: &RequestContext, key: &str) -> Result<()> {
        ctx.run(self.store.delete(key)).await?;
        debug!(key, "Sessions cleared");
        Ok(())
    }

    /// Revoke only the session identified by `cookie_value`.
    ///
    /// Returns whether a session was removed. A malformed or unknown cookie
    /// is not an error.
    pub async fn clear_current(&self, ctx: &RequestContext, cookie_value: &str) -> Result<bool> {
        let Ok((key, token)) = codec::decode(cookie_value) else {
            return Ok(false);
        };

        let now = Utc::now();
        let mut sessions = ctx.run(self.store.read(&key)).await?;
        let pruned = sessions.prune_expired(now);

        let before = sessions.len();
        sessions.retain(|s| !s.token.ct_matches(&token));
        let removed = before != sessions.len();

        if !removed && pruned == 0 {
            return Ok(false);
        }

        if sessions.is_empty() {
            ctx.run(self.store.delete(&key)).await?;
        } else {
            ctx.run(self.store.write(&key, &sessions)).await?;
        }

        debug!(key = %key, removed, pruned, remaining = sessions.len(), "Session cleared");
        Ok(removed)
    }

    /// Check a cookie value and return the identity it proves.
    ///
    /// Returns `None` for a malformed cookie, an unknown key, a token that
    /// matches no session, an expired session, or a store failure. The
    /// cause is deliberately not reported to the caller.
    pub async fn validate(&self, ctx: &RequestContext, cookie_value: &str) -> Option<Identity> {
        let (key, token) = match codec::decode(cookie_value) {
            Ok(parts) => parts,
            Err(reason) => {
                trace!(%reason, "Malformed session cookie");
                return None;
            }
        };

        let sessions = match ctx.run(self.store.read(&key)).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(key = %key, error = %e, "Session lookup failed");
                return None;
            }
        };

        let sessions = prune(sessions, Utc::now());
        let identity = find_match(&sessions, &token).map(|s| Identity::from_session(&key, s));
        trace!(key = %key, authenticated = identity.is_some(), "Session validated");
        identity
    }

    /// List the unexpired sessions under `key`, oldest first.
    pub async fn active_sessions(&self, ctx: &RequestContext, key: &str) -> Result<Vec<Identity>> {
        let sessions = ctx.run(self.store.read(key)).await?;
        Ok(prune(sessions, Utc::now())
            .iter()
            .map(|s| Identity::from_session(key, s))
            .collect())
    }

    /// Write a cookie to `sink` that makes the client drop its session cookie.
    pub fn expire_cookie<S>(&self, sink: &mut S) -> Result<()>
    where
        S: ResponseSink + ?Sized,
    {
        sink.set_cookie(codec::removal_cookie(&self.config))?;
        Ok(())
    }
}

/// Find the session holding `token`.
///
/// Every stored token is compared, in constant time, even after a match.
fn find_match<'a>(sessions: &'a SessionList, token: &SessionToken) -> Option<&'a Session> {
    find_match_by(sessions, |stored| stored.ct_matches(token))
}

fn find_match_by<'a, F>(sessions: &'a SessionList, mut matches: F) -> Option<&'a Session>
where
    F: FnMut(&SessionToken) -> bool,
{
    let mut found = None;
    for session in sessions {
        // Evaluate first so a prior match never short-circuits the comparison
        if matches(&session.token) && found.is_none() {
            found = Some(session);
        }
    }
    found
}
