//! HTTP session management for MCP transport
//!
//! Sessions are created by `initialize`, identified by a UUID sent back in the
//! `Mcp-Session-Id` header, and expire after 30 minutes without activity.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Session metadata for HTTP transport
#[derive(Debug, Clone)]
pub struct StreamableHttpSession {
    pub session_id: Uuid,

    /// Client metadata (User-Agent, protocol version)
    pub client_metadata: HashMap<String, String>,

    pub created_at: DateTime<Utc>,

    /// Updated on each request
    pub last_activity: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl StreamableHttpSession {
    fn new(client_metadata: HashMap<String, String>, idle_timeout: Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            client_metadata,
            created_at: now,
            last_activity: now,
            expires_at: now + idle_timeout,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    fn touch(&mut self, idle_timeout: Duration) {
        let now = Utc::now();
        self.last_activity = now;
        self.expires_at = now + idle_timeout;
    }
}

/// Thread-safe session store
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StreamableHttpSession>>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self::with_timeout(max_sessions, Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES))
    }

    pub fn with_timeout(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
            idle_timeout,
        }
    }

    /// Creates and stores a session
    ///
    /// Expired sessions are purged first so they do not count against the limit.
    ///
    /// # Errors
    /// - `SessionLimitExceeded` if `max_sessions` live sessions exist
    pub fn create_session(
        &self,
        client_metadata: HashMap<String, String>,
    ) -> Result<Uuid, SessionError> {
        let mut sessions = self.sessions.write();
        let now = Utc::now();
        sessions.retain(|_, session| session.expires_at >= now);

        if sessions.len() >= self.max_sessions {
            return Err(SessionError::SessionLimitExceeded(self.max_sessions));
        }

        let session = StreamableHttpSession::new(client_metadata, self.idle_timeout);
        let session_id = session.session_id;
        sessions.insert(session_id, session);

        Ok(session_id)
    }

    /// Validates a session and extends its expiry
    ///
    /// # Errors
    /// - `SessionNotFound` if the id is unknown
    /// - `SessionExpired` if the session idled past its timeout (it is removed)
    pub fn validate_session(&self, session_id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write();

        match sessions.get_mut(&session_id) {
            Some(session) if session.is_expired() => {
                sessions.remove(&session_id);
                Err(SessionError::SessionExpired(session_id))
            }
            Some(session) => {
                session.touch(self.idle_timeout);
                Ok(())
            }
            None => Err(SessionError::SessionNotFound(session_id)),
        }
    }

    pub fn get_session(&self, session_id: Uuid) -> Option<StreamableHttpSession> {
        self.sessions.read().get(&session_id).cloned()
    }

    /// Removes a session, returning whether it existed
    pub fn remove_session(&self, session_id: Uuid) -> bool {
        self.sessions.write().remove(&session_id).is_some()
    }

    /// Removes expired sessions, returning how many were dropped
    pub fn cleanup_expired_sessions(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, session| session.expires_at >= now);
        before - sessions.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session expired: {0}")]
    SessionExpired(Uuid),

    #[error("Session limit exceeded: maximum {0} concurrent sessions")]
    SessionLimitExceeded(usize),

    #[error("Invalid session ID format")]
    InvalidSessionId,
}
