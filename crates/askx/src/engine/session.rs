//! Per-identity sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::Identity;
use super::pool::QuestionId;

/// Conversational position of one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing in flight; menu commands are accepted.
    #[default]
    Idle,
    /// The identity paid for a question and owes us its text.
    AwaitingQuestionText,
    /// The identity drew a question and owes us an answer.
    AwaitingAnswerText,
    /// The identity has a pooled question collecting replies.
    AwaitingReplies,
}

/// Snapshot of the question an identity agreed to answer, captured at match
/// time so expiration can be judged at answer time without re-querying the
/// pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub question_id: QuestionId,
    pub expires_at: DateTime<Utc>,
}

/// Mutable per-identity session.
///
/// Only the orchestrator writes to it, and only while the dispatcher holds
/// this identity's lock. Which transient field is meaningful depends on
/// `state`; everything is cleared on reset and stale values are never
/// trusted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: SessionState,
    /// Meaningful while `AwaitingReplies`: the identity's own pooled
    /// question.
    pub own_question: Option<QuestionId>,
    /// Meaningful while `AwaitingAnswerText`: identity to forward the
    /// answer to.
    pub answer_target: Option<Identity>,
    /// Meaningful while `AwaitingAnswerText`: the matched question.
    pub matched: Option<MatchSnapshot>,
}

impl Session {
    /// Drop all transient linkage, keeping only the state machine position.
    pub fn clear_transient(&mut self) {
        self.own_question = None;
        self.answer_target = None;
        self.matched = None;
    }
}

// ============================================================================
// SessionStore
// ============================================================================

/// Shared identity → session map.
//
// Fuses a per-key lock map with the data it guards: locking the session is
// what serializes event handling for one identity, while different
// identities proceed concurrently. Sessions live for the process lifetime,
// so unlike a plain keyed-lock map there is no stale-entry cleanup.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Identity, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Atomic find-or-insert with an Idle default.
    pub fn get_or_create(&self, identity: &Identity) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
            .clone()
    }

    /// Existing session only; identities never seen return None.
    pub fn get(&self, identity: &Identity) -> Option<Arc<Mutex<Session>>> {
        self.sessions.get(identity).map(|entry| entry.clone())
    }

    /// Number of identities ever seen. Feeds the info report.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
