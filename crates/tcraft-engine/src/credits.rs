//! In-memory credit ledger.
//!
//! An explicit, injected mirror of a user's persisted credit balance. The
//! generation orchestrator consults it for the pre-flight check (no network
//! involved) and re-syncs it after each confirmed balance change. The
//! balance can never go negative.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{EngineError, EngineResult};

/// Mirror of one user's remaining credit balance.
#[derive(Debug)]
pub struct CreditLedger {
    balance: Mutex<u32>,
}

impl CreditLedger {
    pub fn new(balance: u32) -> Self {
        Self {
            balance: Mutex::new(balance),
        }
    }

    /// Current mirrored balance.
    pub fn balance(&self) -> u32 {
        *self.balance.lock().unwrap()
    }

    /// Replace the mirror with a balance read from the store.
    pub fn sync(&self, balance: u32) {
        *self.balance.lock().unwrap() = balance;
    }

    /// Deduct one credit. Fails (and leaves the balance untouched) at zero.
    pub fn debit_one(&self) -> EngineResult<u32> {
        let mut balance = self.balance.lock().unwrap();
        if *balance == 0 {
            return Err(EngineError::InsufficientCredits);
        }
        *balance -= 1;
        Ok(*balance)
    }

    /// Add purchased credits. Each call is one distinct purchase event.
    pub fn add_credits(&self, amount: u32) -> u32 {
        let mut balance = self.balance.lock().unwrap();
        *balance = balance.saturating_add(amount);
        *balance
    }
}

/// Per-user ledger registry shared across request handlers.
#[derive(Debug, Default)]
pub struct CreditLedgers {
    ledgers: Mutex<HashMap<String, Arc<CreditLedger>>>,
}

impl CreditLedgers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the ledger for a user, creating an empty one on first sight.
    /// Callers sync it from the store before trusting the balance.
    pub fn ledger_for(&self, user_id: &str) -> Arc<CreditLedger> {
        let mut ledgers = self.ledgers.lock().unwrap();
        Arc::clone(
            ledgers
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(CreditLedger::new(0))),
        )
    }
}
