//! Read-through balance cache owned by the gateway.
//!
//! Loads and writes run outside the lock. Every successful write bumps a
//! generation counter while it drops its accounts, and a load only fills
//! its entry if no write finished since the load started.

use crate::error::AppError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct CacheState {
    balances: HashMap<i64, i64>,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct BalanceCache {
    state: Mutex<CacheState>,
}

impl BalanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("balance cache lock poisoned; dropping cached entries");
                let mut guard = poisoned.into_inner();
                guard.balances.clear();
                guard.generation = guard.generation.wrapping_add(1);
                guard
            }
        }
    }

    /// Cached balance for `account_id`, loading and remembering it on a miss.
    pub fn get_or_load<F>(&self, account_id: i64, load: F) -> Result<i64, AppError>
    where
        F: FnOnce() -> Result<i64, AppError>,
    {
        let started = {
            let state = self.lock();
            if let Some(balance) = state.balances.get(&account_id) {
                return Ok(*balance);
            }
            state.generation
        };

        let balance = load()?;

        let mut state = self.lock();
        if state.generation == started {
            state.balances.insert(account_id, balance);
        } else {
            log::debug!("balance of account {} raced a write; not cached", account_id);
        }
        Ok(balance)
    }

    /// Run a ledger write, then drop the entries of every account it
    /// reports as touched before returning. A failed write changed
    /// nothing, so nothing is dropped.
    pub fn mutate<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Result<(T, Vec<i64>), AppError>,
    {
        let (value, touched) = op()?;
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        for account_id in touched {
            state.balances.remove(&account_id);
        }
        Ok(value)
    }

    pub fn is_cached(&self, account_id: i64) -> bool {
        self.lock().balances.contains_key(&account_id)
    }
}
