//! Copy ledger: atomic adjustment of physical copy counts

use std::collections::HashMap;
use std::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{CopyRecord, CopyStatus},
};

/// Authoritative count of physical copies per title.
///
/// Exposed only through atomic adjustment operations plus reads; nothing else
/// mutates `available_copies`. The inner lock is held for short, await-free
/// critical sections only.
pub struct CopyLedger {
    records: RwLock<HashMap<String, CopyRecord>>,
}

impl CopyLedger {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new title with its initial stock
    pub fn register(&self, title_key: &str, total_copies: u32) -> AppResult<CopyRecord> {
        let mut records = self.records.write().expect("copy ledger poisoned");
        if records.contains_key(title_key) {
            return Err(AppError::Conflict(format!(
                "Title {} is already registered",
                title_key
            )));
        }
        let record = CopyRecord::new(title_key, total_copies);
        records.insert(title_key.to_string(), record.clone());
        Ok(record)
    }

    pub fn get(&self, title_key: &str) -> AppResult<CopyRecord> {
        self.records
            .read()
            .expect("copy ledger poisoned")
            .get(title_key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Title {} not found", title_key)))
    }

    pub fn list(&self) -> Vec<CopyRecord> {
        let mut records: Vec<CopyRecord> = self
            .records
            .read()
            .expect("copy ledger poisoned")
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| a.title_key.cmp(&b.title_key));
        records
    }

    /// Take one copy for a loan. Fails fast with `OutOfStock` rather than
    /// waiting for availability.
    pub fn try_decrement(&self, title_key: &str) -> AppResult<CopyRecord> {
        self.with_record(title_key, |record| {
            if record.status != CopyStatus::Available || record.available_copies == 0 {
                return Err(AppError::OutOfStock(format!(
                    "No available copies of {}",
                    title_key
                )));
            }
            record.available_copies -= 1;
            record.refresh_status();
            Ok(())
        })
    }

    /// Give one copy back. Exceeding `total_copies` signals a bug upstream
    /// and hard-fails instead of clamping.
    pub fn increment(&self, title_key: &str) -> AppResult<CopyRecord> {
        self.with_record(title_key, |record| {
            if record.available_copies >= record.total_copies {
                return Err(AppError::InvariantViolation(format!(
                    "Available copies of {} would exceed total ({}/{})",
                    title_key, record.available_copies, record.total_copies
                )));
            }
            record.available_copies += 1;
            record.refresh_status();
            Ok(())
        })
    }

    /// Add newly acquired copies to the stock
    pub fn add_copies(&self, title_key: &str, n: u32) -> AppResult<CopyRecord> {
        if n == 0 {
            return Err(AppError::Validation("Copies to add must be positive".to_string()));
        }
        self.with_record(title_key, |record| {
            record.total_copies += n;
            record.available_copies += n;
            record.refresh_status();
            Ok(())
        })
    }

    /// Remove copies from the stock. Rejected if it would take more copies
    /// than are currently on the shelf.
    pub fn retire_copies(&self, title_key: &str, n: u32) -> AppResult<CopyRecord> {
        if n == 0 {
            return Err(AppError::Validation("Copies to retire must be positive".to_string()));
        }
        self.with_record(title_key, |record| {
            if n > record.available_copies {
                return Err(AppError::Conflict(format!(
                    "Cannot retire {} copies of {}; only {} available",
                    n, title_key, record.available_copies
                )));
            }
            record.total_copies -= n;
            record.available_copies -= n;
            record.refresh_status();
            Ok(())
        })
    }

    /// Retire a copy that was out on loan and reported lost. The copy was not
    /// on the shelf, so only `total_copies` drops; availability is untouched.
    pub fn retire_lost(&self, title_key: &str) -> AppResult<CopyRecord> {
        self.with_record(title_key, |record| {
            if record.total_copies == 0 || record.available_copies >= record.total_copies {
                return Err(AppError::InvariantViolation(format!(
                    "No loaned-out copy of {} to retire ({}/{})",
                    title_key, record.available_copies, record.total_copies
                )));
            }
            record.total_copies -= 1;
            record.refresh_status();
            Ok(())
        })
    }

    /// Pin or clear the MAINTENANCE status. While pinned, `try_decrement`
    /// refuses checkouts regardless of the counts.
    pub fn set_maintenance(&self, title_key: &str, on: bool) -> AppResult<CopyRecord> {
        self.with_record(title_key, |record| {
            if on {
                record.status = CopyStatus::Maintenance;
            } else {
                record.status =
                    CopyRecord::derived_status(record.total_copies, record.available_copies);
            }
            Ok(())
        })
    }

    /// Apply a mutation under the write lock; failures leave the record
    /// untouched because mutations only write after their checks pass.
    fn with_record<F>(&self, title_key: &str, f: F) -> AppResult<CopyRecord>
    where
        F: FnOnce(&mut CopyRecord) -> AppResult<()>,
    {
        let mut records = self.records.write().expect("copy ledger poisoned");
        let record = records
            .get_mut(title_key)
            .ok_or_else(|| AppError::NotFound(format!("Title {} not found", title_key)))?;
        f(record)?;
        debug_assert!(record.available_copies <= record.total_copies);
        Ok(record.clone())
    }
}

impl Default for CopyLedger {
    fn default() -> Self {
        Self::new()
    }
}
