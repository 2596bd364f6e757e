//! In-memory session store.
//!
//! Sessions are short-lived records owned exclusively by the store: callers
//! always receive clones and never hold references across calls. A session's
//! lifecycle is `created -> active -> ended`, and "ended" is terminal
//! deletion: the value returned by [`SessionStore::end`] is the only
//! observation of the record after the transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::error::CoachError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Voice,
    Coaching,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Voice => write!(f, "voice"),
            SessionKind::Coaching => write!(f, "coaching"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One voice or coaching interaction.
///
/// Invariant: a session held by the store always has `active == true`; the
/// flag only flips on the clone handed out by [`SessionStore::end`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub kind: SessionKind,
    pub started_at: DateTime<Utc>,
    pub active: bool,
    pub transcript: Vec<TranscriptEntry>,
    pub context: serde_json::Map<String, serde_json::Value>,
}

struct StoredSession {
    seq: u64,
    session: Session,
}

struct Inner {
    sessions: HashMap<Uuid, StoredSession>,
    next_seq: u64,
}

/// Bounded, mutex-guarded map of active sessions.
pub struct SessionStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl SessionStore {
    /// Creates a store that holds at most `capacity` sessions. Creating a
    /// session beyond capacity evicts the oldest stored one first.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sessions: HashMap::new(),
                next_seq: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a fresh active session with an empty transcript and returns a
    /// clone of the stored record.
    pub fn create(
        &self,
        kind: SessionKind,
        context: serde_json::Map<String, serde_json::Value>,
    ) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            kind,
            started_at: Utc::now(),
            active: true,
            transcript: Vec::new(),
            context,
        };

        let mut inner = self.lock();
        if inner.sessions.len() >= self.capacity {
            // Capacity reached: evict the oldest stored session.
            if let Some(oldest) = inner
                .sessions
                .values()
                .min_by_key(|stored| stored.seq)
                .map(|stored| stored.session.id)
            {
                inner.sessions.remove(&oldest);
                tracing::warn!(session_id = %oldest, "Session store at capacity; evicted oldest session");
            }
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.sessions.insert(
            session.id,
            StoredSession {
                seq,
                session: session.clone(),
            },
        );
        session
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.lock().sessions.get(&id).map(|stored| stored.session.clone())
    }

    /// Appends a transcript entry to an active session and returns the
    /// updated record. Fails with `SessionNotFound` when the id is absent or
    /// the session is no longer active, never silently.
    pub fn append_message(
        &self,
        id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<Session, CoachError> {
        let mut inner = self.lock();
        let stored = inner
            .sessions
            .get_mut(&id)
            .filter(|stored| stored.session.active)
            .ok_or(CoachError::SessionNotFound(id))?;

        stored.session.transcript.push(TranscriptEntry {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        Ok(stored.session.clone())
    }

    /// Removes a session, returning its last known value with `active` set
    /// to `false`. Idempotent in effect: a second call returns `None`.
    pub fn end(&self, id: Uuid) -> Option<Session> {
        self.lock().sessions.remove(&id).map(|stored| {
            let mut session = stored.session;
            session.active = false;
            session
        })
    }

    /// Removes every session, returning the final records in creation order.
    pub fn end_all(&self) -> Vec<Session> {
        let mut inner = self.lock();
        let mut drained: Vec<StoredSession> = inner.sessions.drain().map(|(_, s)| s).collect();
        drained.sort_by_key(|stored| stored.seq);
        drained
            .into_iter()
            .map(|stored| {
                let mut session = stored.session;
                session.active = false;
                session
            })
            .collect()
    }

    /// All currently stored sessions, in creation order. By construction,
    /// every returned record is active.
    pub fn list_active(&self) -> Vec<Session> {
        let inner = self.lock();
        let mut stored: Vec<(u64, Session)> = inner
            .sessions
            .values()
            .map(|stored| (stored.seq, stored.session.clone()))
            .collect();
        stored.sort_by_key(|(seq, _)| *seq);
        stored.into_iter().map(|(_, session)| session).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
