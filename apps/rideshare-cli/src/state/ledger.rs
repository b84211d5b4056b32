//! # Ledger State
//!
//! The shared ride ledger.
//!
//! ## Thread Safety
//! Uses `Arc<Mutex<RideLedger>>`:
//! - `Arc`: every command (and every thread in tests) holds the same ledger
//! - `Mutex`: a transition reads the status and writes the new one under one
//!   lock, so two drivers accepting the same ride cannot both win
//!
//! ```text
//! driver A ──accept(r1)──┐                 ┌──► Ok(accepted_by = A)
//!                        ├──► lock ──► CAS ┤
//! driver B ──accept(r1)──┘                 └──► Err(InvalidRideStatus)
//! ```

use rideshare_core::RideLedger;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle to the ride ledger. Clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    ledger: Arc<Mutex<RideLedger>>,
}

impl LedgerState {
    /// Wraps a ledger restored from storage.
    pub fn new(ledger: RideLedger) -> Self {
        LedgerState {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Executes a function with read access to the ledger.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let pending = ledger_state.with_ledger(|l| l.available_rides().len());
    /// ```
    pub fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RideLedger) -> R,
    {
        // Records are replaced only after every guard passed, so a poisoned
        // lock still holds a consistent ledger.
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&ledger)
    }

    /// Executes a function with write access to the ledger.
    pub fn with_ledger_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RideLedger) -> R,
    {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rideshare_core::{demo, CoreError, Principal, RideStatus, Role};
    use std::sync::Barrier;
    use std::thread;

    fn driver(id: &str) -> Principal {
        Principal {
            id: id.to_string(),
            name: format!("Driver {}", id),
            ..demo::demo_principal(Role::Driver)
        }
    }

    #[test]
    fn test_concurrent_accept_has_one_winner() {
        let state = LedgerState::new(RideLedger::from_records(demo::sample_rides(Utc::now())));
        let drivers = 8;
        let barrier = Arc::new(Barrier::new(drivers));

        let handles: Vec<_> = (0..drivers)
            .map(|n| {
                let state = state.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let me = driver(&format!("d{}", n));
                    barrier.wait();
                    state.with_ledger_mut(|l| l.accept("1", &me, Utc::now()))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);

        for loser in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(
                loser,
                CoreError::InvalidRideStatus {
                    current: RideStatus::Accepted,
                    ..
                }
            ));
        }

        let stored = state.with_ledger(|l| l.get("1").cloned()).unwrap();
        assert_eq!(stored.status, RideStatus::Accepted);
        assert_eq!(stored.accepted_by, winners[0].accepted_by);
    }
}
