//! In-memory stores for lending state
//!
//! All lending state lives in one process; cross-title operations run in
//! parallel while mutations on a single title are serialized through
//! `TitleLocks` in the service layer.

pub mod copies;
pub mod holds;
pub mod loans;
pub mod locks;

use std::sync::Arc;

/// Main repository struct holding all stores
#[derive(Clone)]
pub struct Repository {
    pub copies: Arc<copies::CopyLedger>,
    pub holds: Arc<holds::ReservationQueue>,
    pub loans: Arc<loans::LoanStore>,
    pub locks: Arc<locks::TitleLocks>,
}

impl Repository {
    pub fn new() -> Self {
        Self {
            copies: Arc::new(copies::CopyLedger::new()),
            holds: Arc::new(holds::ReservationQueue::new()),
            loans: Arc::new(loans::LoanStore::new()),
            locks: Arc::new(locks::TitleLocks::new()),
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
