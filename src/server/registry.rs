//! Session registry: code allocation and connection-to-session lookup.
//!
//! Sessions are shared behind `Arc<Mutex<_>>` so the router can hold one
//! session's lock while the registry maps stay available to other
//! connections.

use std::sync::{Arc, Mutex, RwLock};

use rustc_hash::FxHashMap;

use crate::core::BattleRng;
use crate::session::{ConnectionId, Session, SessionCode};

/// Join codes are 4 characters from this alphabet.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 4;

/// All live sessions, addressable by join code, plus the reverse index
/// from connection to session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<FxHashMap<SessionCode, Arc<Mutex<Session>>>>,
    members: RwLock<FxHashMap<ConnectionId, SessionCode>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session under a freshly generated unused code. The
    /// session gets its own forked RNG stream.
    pub fn create(&self, rng: &mut BattleRng) -> (SessionCode, Arc<Mutex<Session>>) {
        let mut sessions = self.sessions.write().expect("registry lock poisoned");
        let code = loop {
            let candidate = generate_code(rng);
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Arc::new(Mutex::new(Session::new(code.clone(), rng.fork())));
        sessions.insert(code.clone(), Arc::clone(&session));
        (code, session)
    }

    /// Look up a session by code.
    #[must_use]
    pub fn get(&self, code: &SessionCode) -> Option<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .expect("registry lock poisoned")
            .get(code)
            .cloned()
    }

    /// Drop a session. Lingering `Arc` handles keep it alive until the
    /// current holders release them.
    pub fn remove(&self, code: &SessionCode) {
        self.sessions
            .write()
            .expect("registry lock poisoned")
            .remove(code);
    }

    /// Record that a connection belongs to a session.
    pub fn bind(&self, connection: ConnectionId, code: SessionCode) {
        self.members
            .write()
            .expect("registry lock poisoned")
            .insert(connection, code);
    }

    /// Forget a connection's session binding, returning it.
    pub fn unbind(&self, connection: ConnectionId) -> Option<SessionCode> {
        self.members
            .write()
            .expect("registry lock poisoned")
            .remove(&connection)
    }

    /// The session a connection belongs to, if any.
    #[must_use]
    pub fn session_of(&self, connection: ConnectionId) -> Option<SessionCode> {
        self.members
            .read()
            .expect("registry lock poisoned")
            .get(&connection)
            .cloned()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().expect("registry lock poisoned").len()
    }

    /// Whether no sessions are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn generate_code(rng: &mut BattleRng) -> SessionCode {
    let code: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range_usize(0..CODE_ALPHABET.len())] as char)
        .collect();
    SessionCode(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_four_chars_from_alphabet() {
        let mut rng = BattleRng::new(3);
        for _ in 0..50 {
            let code = generate_code(&mut rng);
            assert_eq!(code.0.len(), CODE_LEN);
            assert!(code.0.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_create_get_remove() {
        let registry = SessionRegistry::new();
        let mut rng = BattleRng::new(3);

        let (code, session) = registry.create(&mut rng);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&code).is_some());
        assert_eq!(session.lock().unwrap().code, code);

        registry.remove(&code);
        assert!(registry.get(&code).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_member_index() {
        let registry = SessionRegistry::new();
        let mut rng = BattleRng::new(3);
        let (code, _) = registry.create(&mut rng);

        let conn = ConnectionId(42);
        registry.bind(conn, code.clone());
        assert_eq!(registry.session_of(conn), Some(code.clone()));

        assert_eq!(registry.unbind(conn), Some(code));
        assert_eq!(registry.session_of(conn), None);
    }

    #[test]
    fn test_created_sessions_use_distinct_rng_streams() {
        let registry = SessionRegistry::new();
        let mut rng = BattleRng::new(3);
        let (_, a) = registry.create(&mut rng);
        let (_, b) = registry.create(&mut rng);

        let draw_a = a.lock().unwrap().rng.gen_unit();
        let draw_b = b.lock().unwrap().rng.gen_unit();
        assert_ne!(draw_a, draw_b);
    }
}
