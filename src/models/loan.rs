//! Loan model and state machine helpers

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Active,
    Renewed,
    Overdue,
    Returned,
    Lost,
}

impl LoanStatus {
    /// RETURNED and LOST are final; no transition leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Returned | LoanStatus::Lost)
    }

    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }
}

/// One borrowing of one copy of a title by one holder.
///
/// Invariant: a holder has at most one open (non-terminal) loan per title.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: Uuid,
    pub holder_id: i64,
    pub title_key: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub fine_amount: f64,
    pub renewal_count: i32,
}

impl Loan {
    pub fn new(
        holder_id: i64,
        title_key: impl Into<String>,
        borrowed_at: DateTime<Utc>,
        loan_period_days: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            holder_id,
            title_key: title_key.into(),
            borrowed_at,
            due_at: borrowed_at + Duration::days(loan_period_days),
            returned_at: None,
            status: LoanStatus::Active,
            fine_amount: 0.0,
            renewal_count: 0,
        }
    }

    /// Whole days past the due date, by calendar date, never negative.
    pub fn days_late(&self, now: DateTime<Utc>) -> i64 {
        (now.date_naive() - self.due_at.date_naive()).num_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_is_borrow_plus_period() {
        let borrowed = Utc::now();
        let loan = Loan::new(1, "978-0-13-468599-1", borrowed, 14);
        assert_eq!(loan.due_at, borrowed + Duration::days(14));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.renewal_count, 0);
    }

    #[test]
    fn days_late_is_date_based_and_non_negative() {
        let borrowed = Utc::now() - Duration::days(20);
        let loan = Loan::new(1, "k", borrowed, 14);
        assert_eq!(loan.days_late(Utc::now()), 6);
        assert_eq!(loan.days_late(borrowed), 0);
    }

    #[test]
    fn terminal_states() {
        assert!(LoanStatus::Returned.is_terminal());
        assert!(LoanStatus::Lost.is_terminal());
        assert!(LoanStatus::Active.is_open());
        assert!(LoanStatus::Renewed.is_open());
        assert!(LoanStatus::Overdue.is_open());
    }
}
