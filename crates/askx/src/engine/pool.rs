//! Pending-question pool.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

use super::Identity;

/// Unique identifier of a pooled question. Strictly increasing, never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestionId(u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One pending question.
///
/// Handed out of the pool as a cloned snapshot; the pool keeps the original
/// until it is withdrawn or reclaimed. Holders of a snapshot must
/// re-validate against the pool rather than assume the question still
/// exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub asker: Identity,
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Expiry instant, derived from the creation time. Never stored.
    pub fn expires_at(&self, lifetime: TimeDelta) -> DateTime<Utc> {
        self.created_at + lifetime
    }
}

// ============================================================================
// QuestionPool
// ============================================================================

// std::sync::Mutex is correct here: the lock is never held across .await
// points, every operation is a short in-memory critical section.
/// Concurrency-safe set of questions waiting for answers.
///
/// Expiration is not swept here; stale questions are reclaimed lazily by the
/// orchestrator when an expired match is answered.
pub struct QuestionPool {
    inner: Mutex<PoolInner>,
}

struct PoolInner {
    questions: Vec<Question>,
    next_id: u64,
}

impl QuestionPool {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                questions: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Store a question and return its id.
    ///
    /// Text validation (non-empty, length-bounded) happens before this call;
    /// the pool accepts whatever it is given.
    pub fn add(&self, text: impl Into<String>, asker: Identity) -> QuestionId {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        inner.next_id += 1;
        let id = QuestionId(inner.next_id);
        inner.questions.push(Question {
            id,
            text: text.into(),
            asker,
            created_at: Utc::now(),
        });
        id
    }

    /// Uniformly random snapshot of a pending question, or None when empty.
    ///
    /// The question stays pooled. Callers act on the returned snapshot for
    /// the rest of their transaction; a re-query may observe a different
    /// element.
    pub fn pick_random(&self) -> Option<Question> {
        let inner = self.inner.lock().expect("mutex poisoned");
        if inner.questions.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..inner.questions.len());
        Some(inner.questions[index].clone())
    }

    /// Remove a question. Idempotent: unknown ids are a no-op.
    pub fn remove(&self, id: QuestionId) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        inner.questions.retain(|q| q.id != id);
    }

    /// The question currently pooled by the given asker, if any.
    pub fn find_by_asker(&self, asker: &Identity) -> Option<Question> {
        let inner = self.inner.lock().expect("mutex poisoned");
        inner.questions.iter().find(|q| q.asker == *asker).cloned()
    }

    /// Current pool size. Informational reporting only.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("mutex poisoned").questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QuestionPool {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
