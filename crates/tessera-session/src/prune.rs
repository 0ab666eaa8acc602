//! Lazy expiration of stored sessions.
//!
//! Expired sessions are not swept in the background. They are dropped
//! whenever a key's list is read for validation or rewritten, so an expired
//! session never authenticates even while it is still in the store.

use chrono::{DateTime, Utc};

use crate::session::SessionList;

/// Return the sessions of `list` that are still active at `now`.
pub fn prune(list: SessionList, now: DateTime<Utc>) -> SessionList {
    list.into_iter().filter(|s| s.is_active(now)).collect()
}

impl SessionList {
    /// Remove expired sessions in place and return how many were dropped.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.len();
        self.retain(|s| s.is_active(now));
        before - self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::token::SessionToken;
    use chrono::TimeDelta;

    fn list_at(now: DateTime<Utc>, offsets_secs: &[i64]) -> SessionList {
        offsets_secs
            .iter()
            .enumerate()
            .map(|(i, off)| {
                Session::new(
                    SessionToken::new(format!("token-{}", i)),
                    now - TimeDelta::hours(1),
                    now + TimeDelta::seconds(*off),
                )
            })
            .collect()
    }

    #[test]
    fn test_prune_keeps_only_future_expiry() {
        let now = Utc::now();
        let list = list_at(now, &[-10, 0, 10, 20]);

        let pruned = prune(list, now);
        let tokens: Vec<_> = pruned.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(tokens, vec!["token-2", "token-3"]);
    }

    #[test]
    fn test_prune_empty() {
        assert!(prune(SessionList::new(), Utc::now()).is_empty());
    }

    #[test]
    fn test_prune_all_expired() {
        let now = Utc::now();
        assert!(prune(list_at(now, &[-3, -2, -1]), now).is_empty());
    }

    #[test]
    fn test_prune_expired_in_place() {
        let now = Utc::now();
        let mut list = list_at(now, &[-5, 5, -1]);

        assert_eq!(list.prune_expired(now), 2);
        assert_eq!(list.len(), 1);
        assert_eq!(list.prune_expired(now), 0);
    }
}
