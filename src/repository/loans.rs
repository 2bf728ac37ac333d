//! Loan store: records for the loan state machine

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Loan, LoanStatus},
};

/// Keyed loan records.
///
/// The store offers conditional transitions so sweeps stay correct when run
/// concurrently with live traffic; business preconditions live in the
/// service layer under the per-title lock.
pub struct LoanStore {
    loans: RwLock<HashMap<Uuid, Loan>>,
}

impl LoanStore {
    pub fn new() -> Self {
        Self {
            loans: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, loan: Loan) -> AppResult<Loan> {
        let mut loans = self.loans.write().expect("loan store poisoned");
        if loans.contains_key(&loan.id) {
            return Err(AppError::InvariantViolation(format!(
                "Loan id collision on {}",
                loan.id
            )));
        }
        loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    pub fn get(&self, loan_id: Uuid) -> AppResult<Loan> {
        self.loans
            .read()
            .expect("loan store poisoned")
            .get(&loan_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", loan_id)))
    }

    /// The holder's unique open loan for a title, if any
    pub fn find_open(&self, holder_id: i64, title_key: &str) -> Option<Loan> {
        self.loans
            .read()
            .expect("loan store poisoned")
            .values()
            .find(|l| l.holder_id == holder_id && l.title_key == title_key && l.status.is_open())
            .cloned()
    }

    pub fn count_open(&self, holder_id: i64) -> usize {
        self.loans
            .read()
            .expect("loan store poisoned")
            .values()
            .filter(|l| l.holder_id == holder_id && l.status.is_open())
            .count()
    }

    pub fn list_for_holder(&self, holder_id: i64) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .loans
            .read()
            .expect("loan store poisoned")
            .values()
            .filter(|l| l.holder_id == holder_id)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.borrowed_at);
        loans
    }

    /// Open loans past due at `as_of`
    pub fn list_overdue(&self, as_of: DateTime<Utc>) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .loans
            .read()
            .expect("loan store poisoned")
            .values()
            .filter(|l| l.status.is_open() && l.due_at < as_of)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.due_at);
        loans
    }

    /// Open loans falling due within the window (`as_of`, `as_of + days`]
    pub fn list_due_soon(&self, as_of: DateTime<Utc>, days: i64) -> Vec<Loan> {
        let horizon = as_of + chrono::Duration::days(days);
        let mut loans: Vec<Loan> = self
            .loans
            .read()
            .expect("loan store poisoned")
            .values()
            .filter(|l| l.status.is_open() && l.due_at > as_of && l.due_at <= horizon)
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.due_at);
        loans
    }

    /// Apply a mutation to a loan under the write lock. The closure sees the
    /// current record and may refuse the transition.
    pub fn update<F>(&self, loan_id: Uuid, f: F) -> AppResult<Loan>
    where
        F: FnOnce(&mut Loan) -> AppResult<()>,
    {
        let mut loans = self.loans.write().expect("loan store poisoned");
        let loan = loans
            .get_mut(&loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", loan_id)))?;
        f(loan)?;
        Ok(loan.clone())
    }

    /// Conditionally move a loan to OVERDUE. Returns the updated loan only
    /// when this call performed the transition, so the caller fires the fine
    /// exactly once per due-date crossing.
    pub fn transition_overdue(
        &self,
        loan_id: Uuid,
        as_of: DateTime<Utc>,
        fine_amount: f64,
    ) -> Option<Loan> {
        let mut loans = self.loans.write().expect("loan store poisoned");
        let loan = loans.get_mut(&loan_id)?;
        if !loan.status.is_open() || loan.status == LoanStatus::Overdue || loan.due_at >= as_of {
            return None;
        }
        loan.status = LoanStatus::Overdue;
        loan.fine_amount = fine_amount;
        Some(loan.clone())
    }
}

impl Default for LoanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn find_open_ignores_terminal_loans() {
        let store = LoanStore::new();
        let mut loan = Loan::new(1, "isbn", Utc::now(), 14);
        loan.status = LoanStatus::Returned;
        let returned_id = loan.id;
        store.insert(loan).unwrap();
        assert!(store.find_open(1, "isbn").is_none());

        let open = Loan::new(1, "isbn", Utc::now(), 14);
        store.insert(open.clone()).unwrap();
        assert_eq!(store.find_open(1, "isbn").unwrap().id, open.id);
        assert_ne!(open.id, returned_id);
        assert_eq!(store.count_open(1), 1);
    }

    #[test]
    fn transition_overdue_fires_once() {
        let store = LoanStore::new();
        let loan = Loan::new(1, "isbn", Utc::now() - Duration::days(20), 14);
        let id = store.insert(loan).unwrap().id;

        let now = Utc::now();
        let updated = store.transition_overdue(id, now, 6.0).unwrap();
        assert_eq!(updated.status, LoanStatus::Overdue);
        assert_eq!(updated.fine_amount, 6.0);
        // Second pass is a no-op
        assert!(store.transition_overdue(id, now, 6.0).is_none());
    }

    #[test]
    fn transition_overdue_skips_not_yet_due() {
        let store = LoanStore::new();
        let loan = Loan::new(1, "isbn", Utc::now(), 14);
        let id = store.insert(loan).unwrap().id;
        assert!(store.transition_overdue(id, Utc::now(), 0.0).is_none());
    }

    #[test]
    fn due_soon_window() {
        let store = LoanStore::new();
        let now = Utc::now();
        store.insert(Loan::new(1, "a", now - Duration::days(12), 14)).unwrap();
        store.insert(Loan::new(2, "b", now - Duration::days(2), 14)).unwrap();
        let soon = store.list_due_soon(now, 3);
        assert_eq!(soon.len(), 1);
        assert_eq!(soon[0].title_key, "a");
    }
}
