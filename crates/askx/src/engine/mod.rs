//! Matching and session engine.
//!
//! Everything with real invariants lives here: the per-identity
//! conversational state machine ([`orchestrator`]), the concurrency-safe
//! pool of pending questions ([`pool`]), the token economy that rate-limits
//! asking ([`ledger`]), and the dispatch layer that serializes events per
//! identity and owns the fault boundary ([`dispatcher`]).
//!
//! The engine is transport-agnostic: inbound events arrive as
//! `(Identity, MessageBody)` pairs and outbound notices leave through the
//! [`Notifier`] trait. Rendering notices to user-facing text happens
//! outside, in `crate::texts`.

use std::fmt;

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod orchestrator;
pub mod pool;
pub mod session;

pub use command::Command;
pub use dispatcher::Dispatcher;
pub use error::{EngineError, Result};
pub use ledger::TokenLedger;
pub use notify::{MessageBody, Notice, Notifier};
pub use orchestrator::{ExpiredMatch, Orchestrator};
pub use pool::{Question, QuestionId, QuestionPool};
pub use session::{MatchSnapshot, Session, SessionState, SessionStore};

// ============================================================================
// Identity
// ============================================================================

/// Stable, opaque key identifying one chat participant.
///
/// Supplied by the transport (the Telegram gateway uses the decimal chat
/// id). The engine only ever uses it as a map key and notification address;
/// it carries no meaning beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}
