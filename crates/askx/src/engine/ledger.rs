//! Token accounting.

use dashmap::DashMap;

use super::Identity;
use super::error::{EngineError, Result};

/// Per-identity token balances.
///
/// Balances are non-negative by construction: [`TokenLedger::charge`]
/// refuses to overdraw and [`TokenLedger::credit`] saturates. An entry is
/// materialized with the starting balance the first time an identity is
/// observed and never removed.
///
/// Entries are updated through the concurrent map's entry API, so charges
/// and credits for independent identities never contend on a global lock.
pub struct TokenLedger {
    balances: DashMap<Identity, u32>,
    starting_balance: u32,
}

impl TokenLedger {
    pub fn new(starting_balance: u32) -> Self {
        Self {
            balances: DashMap::new(),
            starting_balance,
        }
    }

    /// Current balance, materializing the default entry on first contact.
    pub fn balance(&self, identity: &Identity) -> u32 {
        *self
            .balances
            .entry(identity.clone())
            .or_insert(self.starting_balance)
    }

    pub fn can_afford(&self, identity: &Identity, cost: u32) -> bool {
        self.balance(identity) >= cost
    }

    /// Deduct `cost` from the balance.
    ///
    /// Callers check [`TokenLedger::can_afford`] first; an insufficient
    /// balance here is a contract violation, not a user-facing condition.
    pub fn charge(&self, identity: &Identity, cost: u32) -> Result<()> {
        let mut entry = self
            .balances
            .entry(identity.clone())
            .or_insert(self.starting_balance);
        if *entry < cost {
            return Err(EngineError::InsufficientBalance {
                identity: identity.clone(),
                balance: *entry,
                cost,
            });
        }
        *entry -= cost;
        Ok(())
    }

    /// Add `amount` to the balance, saturating at the numeric ceiling.
    pub fn credit(&self, identity: &Identity, amount: u32) {
        let mut entry = self
            .balances
            .entry(identity.clone())
            .or_insert(self.starting_balance);
        *entry = entry.saturating_add(amount);
    }

    /// Raise the balance to `minimum` if it is currently below it.
    ///
    /// Keeps an identity that spent its last tokens from being locked out
    /// when there is nothing to answer for a reward.
    pub fn grant_if_below(&self, identity: &Identity, minimum: u32) {
        let mut entry = self
            .balances
            .entry(identity.clone())
            .or_insert(self.starting_balance);
        if *entry < minimum {
            *entry = minimum;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
