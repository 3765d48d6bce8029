//! Session identity and flash notices.
//!
//! Sessions live in memory and are keyed by an opaque id the HTTP host keeps
//! in a cookie. Flash notices queue up until the next rendered view drains
//! them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Default idle lifetime of a session.
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in control panel user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Notice,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Session services consumed by the controller.
pub trait SessionGateway: Send + Sync {
    /// Signed-in user for the session, if any.
    fn identity(&self, session: &SessionId) -> Option<Identity>;

    fn set_notice(&self, session: &SessionId, message: &str);

    fn set_error(&self, session: &SessionId, message: &str);

    /// Remove and return queued flash notices, oldest first.
    fn take_flashes(&self, session: &SessionId) -> Vec<Flash>;
}

#[derive(Debug)]
struct SessionState {
    identity: Option<Identity>,
    flashes: Vec<Flash>,
    last_accessed: Instant,
}

impl SessionState {
    fn new() -> Self {
        Self {
            identity: None,
            flashes: Vec::new(),
            last_accessed: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    fn is_expired(&self, max_age: Duration) -> bool {
        self.last_accessed.elapsed() > max_age
    }
}

/// Thread-safe in-memory session store.
#[derive(Debug)]
pub struct InMemorySessionGateway {
    sessions: Mutex<HashMap<SessionId, SessionState>>,
    max_age: Duration,
}

impl Default for InMemorySessionGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_MAX_AGE)
    }
}

impl InMemorySessionGateway {
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_age,
        }
    }

    /// Create a fresh anonymous session.
    pub fn start_session(&self) -> SessionId {
        let id = SessionId::generate();
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.insert(id.clone(), SessionState::new());
        id
    }

    /// Resume the session named by a cookie, or hand out a fresh id when it is
    /// unknown or expired. Fresh ids are not stored until the session is
    /// signed in or receives a flash.
    pub fn resume(&self, cookie_value: Option<&str>) -> SessionId {
        if let Some(value) = cookie_value {
            let id = SessionId::from(value);
            let mut sessions = self.sessions.lock().expect("session lock poisoned");
            match sessions.get_mut(&id) {
                Some(state) if !state.is_expired(self.max_age) => {
                    state.touch();
                    return id;
                }
                Some(_) => {
                    debug!("session expired");
                    sessions.remove(&id);
                }
                None => {}
            }
        }
        SessionId::generate()
    }

    pub fn sign_in(&self, session: &SessionId, identity: Identity) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        if !sessions.contains_key(session) {
            let before = sessions.len();
            sessions.retain(|_, state| !state.is_expired(self.max_age));
            if sessions.len() < before {
                debug!(evicted = before - sessions.len(), "evicted expired sessions");
            }
        }
        let state = sessions.entry(session.clone()).or_insert_with(SessionState::new);
        state.touch();
        state.identity = Some(identity);
    }

    pub fn sign_out(&self, session: &SessionId) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        if let Some(state) = sessions.get_mut(session) {
            state.identity = None;
        }
    }

    /// Number of stored sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_flash(&self, session: &SessionId, kind: FlashKind, message: &str) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        let state = sessions.entry(session.clone()).or_insert_with(SessionState::new);
        state.flashes.push(Flash {
            kind,
            message: message.to_string(),
        });
    }
}

impl SessionGateway for InMemorySessionGateway {
    fn identity(&self, session: &SessionId) -> Option<Identity> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions
            .get(session)
            .filter(|state| !state.is_expired(self.max_age))
            .and_then(|state| state.identity.clone())
    }

    fn set_notice(&self, session: &SessionId, message: &str) {
        self.push_flash(session, FlashKind::Notice, message);
    }

    fn set_error(&self, session: &SessionId, message: &str) {
        self.push_flash(session, FlashKind::Error, message);
    }

    fn take_flashes(&self, session: &SessionId) -> Vec<Flash> {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        sessions
            .get_mut(session)
            .map(|state| std::mem::take(&mut state.flashes))
            .unwrap_or_default()
    }
}
