//! Lending service: the loan state machine and its orchestration
//!
//! Sequences the copy ledger, reservation queue and loan store under the
//! per-title lock, and talks to the identity and fine ledger collaborators.
//! This is the only entry point for loan state transitions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{HolderIdentity, Loan, LoanStatus},
    repository::Repository,
    services::{
        fines::{FineKind, FineLedger},
        identity::IdentityService,
    },
};

pub struct CheckoutRequest {
    pub holder_id: i64,
    pub title_key: String,
    pub actor_id: i64,
}

pub struct MarkLostRequest {
    pub loan_id: Uuid,
    pub actor_id: i64,
    pub replacement_cost: Option<f64>,
}

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    identity: Arc<dyn IdentityService>,
    fines: Arc<dyn FineLedger>,
    lending: Arc<LendingConfig>,
}

impl LendingService {
    pub fn new(
        repository: Repository,
        identity: Arc<dyn IdentityService>,
        fines: Arc<dyn FineLedger>,
        lending: Arc<LendingConfig>,
    ) -> Self {
        Self {
            repository,
            identity,
            fines,
            lending,
        }
    }

    /// Check a copy out to a holder, honoring reservation priority.
    ///
    /// The decrement and the loan creation are compensating: a failure after
    /// the decrement rolls the copy back before the error surfaces, so no
    /// copy leaks.
    pub async fn checkout(&self, request: CheckoutRequest) -> AppResult<Loan> {
        let actor = self.identity.validate(request.actor_id).await?;
        if !actor.role.can_approve() {
            return Err(AppError::Unauthorized(
                "Only librarians and admins can create loans".to_string(),
            ));
        }
        let holder = self.validate_borrower(request.holder_id).await?;

        let _guard = self.repository.locks.acquire(&request.title_key).await;

        if self.repository.loans.count_open(holder.holder_id) >= self.lending.max_loans {
            return Err(AppError::QuotaExceeded(format!(
                "Holder {} has reached the maximum of {} open loans",
                holder.holder_id, self.lending.max_loans
            )));
        }
        if self
            .repository
            .loans
            .find_open(holder.holder_id, &request.title_key)
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Holder {} already has an open loan on {}",
                holder.holder_id, request.title_key
            )));
        }
        // A freed copy goes to the head of the queue, never around it
        if self
            .repository
            .holds
            .is_blocking(&request.title_key, holder.holder_id)
        {
            return Err(AppError::Blocked(format!(
                "{} is reserved by another holder",
                request.title_key
            )));
        }

        self.repository.copies.try_decrement(&request.title_key)?;

        let loan = Loan::new(
            holder.holder_id,
            request.title_key.clone(),
            Utc::now(),
            self.lending.loan_period_days,
        );
        let loan = match self.repository.loans.insert(loan) {
            Ok(loan) => loan,
            Err(e) => {
                // Compensate the decrement before surfacing the error
                if let Err(rollback) = self.repository.copies.increment(&request.title_key) {
                    tracing::error!(
                        title_key = %request.title_key,
                        error = %rollback,
                        "Checkout compensation failed; copy count may be off"
                    );
                }
                return Err(e);
            }
        };

        self.repository
            .holds
            .fulfill(holder.holder_id, &request.title_key);

        tracing::info!(
            loan_id = %loan.id,
            holder_id = holder.holder_id,
            actor_id = request.actor_id,
            title_key = %request.title_key,
            due_at = %loan.due_at,
            "Loan created"
        );
        Ok(loan)
    }

    /// Extend a loan by one period.
    ///
    /// Any non-empty queue blocks renewal, even the holder's own hold; this
    /// is stricter than checkout's rule and deliberate.
    pub async fn renew(&self, loan_id: Uuid, holder_id: i64) -> AppResult<Loan> {
        let loan = self.repository.loans.get(loan_id)?;
        if loan.holder_id != holder_id {
            return Err(AppError::Unauthorized(
                "Loan does not belong to this holder".to_string(),
            ));
        }

        let _guard = self.repository.locks.acquire(&loan.title_key).await;

        if self.repository.holds.peek_next(&loan.title_key).is_some() {
            return Err(AppError::Blocked(format!(
                "{} has waiting reservations",
                loan.title_key
            )));
        }

        let period = self.lending.loan_period_days;
        let max_renewals = self.lending.max_renewals;
        let loan = self.repository.loans.update(loan_id, |loan| {
            match loan.status {
                LoanStatus::Active | LoanStatus::Renewed => {}
                LoanStatus::Overdue => {
                    return Err(AppError::Conflict(
                        "Cannot renew an overdue loan".to_string(),
                    ))
                }
                LoanStatus::Returned | LoanStatus::Lost => {
                    return Err(AppError::Conflict(
                        "Cannot renew a closed loan".to_string(),
                    ))
                }
            }
            if loan.renewal_count >= max_renewals {
                return Err(AppError::Conflict(format!(
                    "Maximum renewals reached ({}/{})",
                    loan.renewal_count, max_renewals
                )));
            }
            loan.due_at += Duration::days(period);
            loan.status = LoanStatus::Renewed;
            loan.renewal_count += 1;
            Ok(())
        })?;

        tracing::info!(
            loan_id = %loan.id,
            holder_id = holder_id,
            due_at = %loan.due_at,
            renewal_count = loan.renewal_count,
            "Loan renewed"
        );
        Ok(loan)
    }

    /// Return the holder's open loan on a title, assessing any overdue fine.
    pub async fn return_copy(
        &self,
        holder_id: i64,
        title_key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let _guard = self.repository.locks.acquire(title_key).await;

        let open = self
            .repository
            .loans
            .find_open(holder_id, title_key)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No open loan for holder {} on {}",
                    holder_id, title_key
                ))
            })?;

        let days_late = open.days_late(now);
        let fine = days_late as f64 * self.lending.fine_per_day;

        let loan = self.repository.loans.update(open.id, |loan| {
            loan.status = LoanStatus::Returned;
            loan.returned_at = Some(now);
            if days_late > 0 {
                loan.fine_amount = fine;
            }
            Ok(())
        })?;

        if days_late > 0 {
            // Best-effort: the return stands even if the fine call fails
            if let Err(e) = self
                .fines
                .create_fine(holder_id, loan.id, title_key, FineKind::Overdue, fine)
                .await
            {
                tracing::warn!(loan_id = %loan.id, error = %e, "Overdue fine call failed");
            }
        }

        self.repository.copies.increment(title_key)?;

        tracing::info!(
            loan_id = %loan.id,
            holder_id = holder_id,
            title_key = %title_key,
            days_late = days_late,
            fine_amount = loan.fine_amount,
            "Loan returned"
        );
        Ok(loan)
    }

    /// Report a borrowed copy lost. Closes the loan, charges the replacement
    /// cost, and retires the copy from total stock; availability is never
    /// incremented for a book that is physically gone.
    pub async fn mark_lost(&self, request: MarkLostRequest) -> AppResult<Loan> {
        let actor = self.identity.validate(request.actor_id).await?;
        if !actor.role.can_approve() {
            return Err(AppError::Unauthorized(
                "Only librarians and admins can report lost copies".to_string(),
            ));
        }

        let loan = self.repository.loans.get(request.loan_id)?;
        let _guard = self.repository.locks.acquire(&loan.title_key).await;

        let now = Utc::now();
        let cost = request
            .replacement_cost
            .unwrap_or(self.lending.default_replacement_cost);
        let loan = self.repository.loans.update(request.loan_id, |loan| {
            if loan.status.is_terminal() {
                return Err(AppError::Conflict(
                    "Only open loans can be marked lost".to_string(),
                ));
            }
            loan.status = LoanStatus::Lost;
            loan.returned_at = Some(now);
            loan.fine_amount = cost;
            Ok(())
        })?;

        if let Err(e) = self
            .fines
            .create_fine(
                loan.holder_id,
                loan.id,
                &loan.title_key,
                FineKind::LostBook,
                cost,
            )
            .await
        {
            tracing::warn!(loan_id = %loan.id, error = %e, "Lost book fine call failed");
        }

        self.repository.copies.retire_lost(&loan.title_key)?;

        tracing::info!(
            loan_id = %loan.id,
            holder_id = loan.holder_id,
            actor_id = request.actor_id,
            title_key = %loan.title_key,
            replacement_cost = cost,
            "Loan marked lost"
        );
        Ok(loan)
    }

    /// Move every open loan past due to OVERDUE, charging the accrued fine
    /// exactly once per due-date crossing. Per-loan failures are logged and
    /// the batch continues.
    pub async fn sweep_overdue(&self, as_of: DateTime<Utc>) -> usize {
        let candidates = self.repository.loans.list_overdue(as_of);
        let mut transitioned = 0;
        for candidate in candidates {
            if candidate.status == LoanStatus::Overdue {
                continue;
            }
            let fine = candidate.days_late(as_of) as f64 * self.lending.fine_per_day;
            // Conditional transition: another sweep or a return may have won
            let Some(loan) = self
                .repository
                .loans
                .transition_overdue(candidate.id, as_of, fine)
            else {
                continue;
            };
            transitioned += 1;

            if let Err(e) = self
                .fines
                .create_fine(
                    loan.holder_id,
                    loan.id,
                    &loan.title_key,
                    FineKind::Overdue,
                    fine,
                )
                .await
            {
                tracing::warn!(loan_id = %loan.id, error = %e, "Overdue fine call failed");
            }

            tracing::info!(
                loan_id = %loan.id,
                holder_id = loan.holder_id,
                title_key = %loan.title_key,
                fine_amount = fine,
                "Loan marked overdue"
            );
        }
        transitioned
    }

    pub fn get_loan(&self, loan_id: Uuid) -> AppResult<Loan> {
        self.repository.loans.get(loan_id)
    }

    pub fn list_for_holder(&self, holder_id: i64) -> Vec<Loan> {
        self.repository.loans.list_for_holder(holder_id)
    }

    pub fn list_overdue(&self, as_of: DateTime<Utc>) -> Vec<Loan> {
        self.repository.loans.list_overdue(as_of)
    }

    pub fn list_due_soon(&self, as_of: DateTime<Utc>, days: i64) -> Vec<Loan> {
        self.repository.loans.list_due_soon(as_of, days)
    }

    async fn validate_borrower(&self, holder_id: i64) -> AppResult<HolderIdentity> {
        let holder = self.identity.validate(holder_id).await?;
        if !holder.active {
            return Err(AppError::Unauthorized("Holder account is not active".to_string()));
        }
        if !holder.role.can_borrow() {
            return Err(AppError::Unauthorized("Loans can only be created for students".to_string()));
        }
        Ok(holder)
    }
}
