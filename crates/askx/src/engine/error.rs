//! Engine error types.

use thiserror::Error;

use super::Identity;

/// Errors surfaced by engine transitions.
///
/// Both variants are programming-contract violations rather than user-facing
/// conditions: the dispatcher logs them and answers the acting identity with
/// a generic fault notice, leaving the session as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A charge was attempted without checking affordability first.
    #[error("insufficient balance for {identity}: have {balance}, need {cost}")]
    InsufficientBalance {
        identity: Identity,
        balance: u32,
        cost: u32,
    },

    /// An answer was submitted with no recorded identity to deliver it to.
    #[error("no answer target recorded for {0}")]
    MissingAnswerTarget(Identity),
}

pub type Result<T> = std::result::Result<T, EngineError>;
