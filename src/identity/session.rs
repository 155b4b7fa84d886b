use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use base64::Engine;
use crate::tprintln;

use super::principal::Principal;

pub type SessionToken = String;

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub token: SessionToken,
    pub principal: Principal,
    pub issued_at: Instant,
    pub expires_at: Instant,
}

#[derive(Debug)]
struct SessionEntry {
    session: Session,
}

static SESSIONS: Lazy<RwLock<HashMap<String, SessionEntry>>> = Lazy::new(|| RwLock::new(HashMap::new()));
static USER_INDEX: Lazy<RwLock<HashMap<String, HashSet<String>>>> = Lazy::new(|| RwLock::new(HashMap::new()));
// Tombstone -> deadline; a tombstone only matters until the session it blocks
// would have expired anyway, so entries are pruned past that deadline.
static REVOKED: Lazy<RwLock<HashMap<String, Instant>>> = Lazy::new(|| RwLock::new(HashMap::new()));

fn prune_tombstones(now: Instant) {
    REVOKED.write().retain(|_, deadline| *deadline > now);
}

fn gen_id() -> String {
    // 256-bit random token base64url without padding
    let mut buf = [0u8; 32];
    let _ = getrandom::getrandom(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

pub struct SessionManager {
    pub ttl: Duration,
}

impl Default for SessionManager {
    // One working shift; the browser tab rarely outlives it
    fn default() -> Self { Self { ttl: Duration::from_secs(8 * 60 * 60) } }
}

impl SessionManager {
    pub fn issue(&self, principal: Principal) -> Session {
        let now = Instant::now();
        let sid = gen_id();
        let token = gen_id();
        let sess = Session {
            session_id: sid.clone(),
            token: token.clone(),
            principal: principal.clone(),
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let entry = SessionEntry { session: sess.clone() };
        {
            let mut m = SESSIONS.write();
            m.insert(token.clone(), entry);
        }
        {
            let mut uidx = USER_INDEX.write();
            let set = uidx.entry(principal.username.clone()).or_insert_with(HashSet::new);
            set.insert(token.clone());
        }
        tprintln!("session.issue user={} sid={} ttl_secs={}", principal.username, sid, self.ttl.as_secs());
        sess
    }

    pub fn validate(&self, token: &str) -> Option<Principal> {
        if REVOKED.read().contains_key(token) { return None; }
        let now = Instant::now();
        let mut drop_key: Option<String> = None;
        let out = {
            let map = SESSIONS.read();
            if let Some(ent) = map.get(token) {
                if ent.session.expires_at > now {
                    Some(ent.session.principal.clone())
                } else {
                    drop_key = Some(token.to_string());
                    None
                }
            } else { None }
        };
        if let Some(k) = drop_key {
            SESSIONS.write().remove(&k);
        }
        out
    }

    pub fn logout(&self, token: &str) -> bool {
        prune_tombstones(Instant::now());
        let mut removed = false;
        if let Some(ent) = SESSIONS.write().remove(token) {
            removed = true;
            let uname = ent.session.principal.username;
            let mut idx = USER_INDEX.write();
            if let Some(set) = idx.get_mut(&uname) { set.remove(token); }
            REVOKED.write().insert(token.to_string(), ent.session.expires_at);
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn tombstone_deadline(token: &str) -> Option<Instant> {
        REVOKED.read().get(token).copied()
    }

    pub fn revoke_user(&self, username: &str) -> usize {
        prune_tombstones(Instant::now());
        let mut count = 0usize;
        if let Some(tokens) = USER_INDEX.read().get(username).cloned() {
            let mut s = SESSIONS.write();
            let mut r = REVOKED.write();
            for t in tokens.iter() {
                if let Some(ent) = s.remove(t) {
                    count += 1;
                    r.insert(t.clone(), ent.session.expires_at);
                }
            }
        }
        tprintln!("session.revoke user={} count={}", username, count);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PermissionSet;

    fn principal(username: &str) -> Principal {
        Principal {
            username: username.to_string(),
            display_name: username.to_string(),
            role: String::new(),
            permissions: PermissionSet::parse("1"),
        }
    }

    #[test]
    fn logout_tombstones_carry_the_session_deadline() {
        let sm = SessionManager::default();
        let sess = sm.issue(principal("tombstone_deadline_user"));
        assert!(sm.logout(&sess.token));
        let deadline = SessionManager::tombstone_deadline(&sess.token).expect("tombstoned");
        assert_eq!(deadline, sess.expires_at);
    }

    #[test]
    fn expired_tombstones_are_pruned_on_the_next_mutation() {
        let sm = SessionManager { ttl: Duration::from_secs(0) };
        let dead = sm.issue(principal("pruned_tombstone_user"));
        assert!(sm.logout(&dead.token));

        // A later logout prunes the already-expired tombstone
        let sm_live = SessionManager::default();
        let live = sm_live.issue(principal("live_tombstone_user"));
        assert!(sm_live.logout(&live.token));

        assert!(SessionManager::tombstone_deadline(&dead.token).is_none());
        assert!(SessionManager::tombstone_deadline(&live.token).is_some());
    }
}
