//! Reservation service: holder-facing queue operations

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::ReservationHold,
    repository::Repository,
    services::identity::IdentityService,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    identity: Arc<dyn IdentityService>,
    lending: Arc<LendingConfig>,
}

impl ReservationsService {
    pub fn new(
        repository: Repository,
        identity: Arc<dyn IdentityService>,
        lending: Arc<LendingConfig>,
    ) -> Self {
        Self {
            repository,
            identity,
            lending,
        }
    }

    /// Place a hold at the tail of the title's queue
    pub async fn reserve(&self, holder_id: i64, title_key: &str) -> AppResult<ReservationHold> {
        let holder = self.identity.validate(holder_id).await?;
        if !holder.active {
            return Err(AppError::Unauthorized("Holder account is not active".to_string()));
        }
        if !holder.role.can_borrow() {
            return Err(AppError::Unauthorized("Only students can reserve titles".to_string()));
        }

        let _guard = self.repository.locks.acquire(title_key).await;

        // A hold must reference a registered title
        self.repository.copies.get(title_key)?;

        let hold = self.repository.holds.place(
            holder_id,
            title_key,
            Utc::now(),
            self.lending.hold_expiry_days,
            self.lending.max_holds,
        )?;

        tracing::info!(
            holder_id = holder_id,
            title_key = %title_key,
            hold_id = %hold.id,
            expires_at = %hold.expires_at,
            "Reservation placed"
        );
        Ok(hold)
    }

    /// Holder-initiated cancellation of an active hold
    pub fn cancel(&self, hold_id: Uuid, holder_id: i64) -> AppResult<ReservationHold> {
        let hold = self.repository.holds.cancel(hold_id, holder_id)?;
        tracing::info!(hold_id = %hold_id, holder_id = holder_id, "Reservation cancelled");
        Ok(hold)
    }

    pub fn list_for_holder(&self, holder_id: i64) -> Vec<ReservationHold> {
        self.repository.holds.list_for_holder(holder_id)
    }

    pub fn list_for_title(&self, title_key: &str) -> AppResult<Vec<ReservationHold>> {
        self.repository.copies.get(title_key)?;
        Ok(self.repository.holds.list_for_title(title_key))
    }

    /// Expire lapsed holds. Safe on any cadence and concurrently with live
    /// traffic; each hold transitions at most once.
    pub fn sweep_expired(&self, as_of: DateTime<Utc>) -> usize {
        let expired = self.repository.holds.sweep_expired(as_of);
        for hold in &expired {
            tracing::info!(
                hold_id = %hold.id,
                holder_id = hold.holder_id,
                title_key = %hold.title_key,
                "Reservation expired"
            );
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HolderIdentity, Role};
    use crate::services::identity::MockIdentityService;

    fn student(holder_id: i64) -> HolderIdentity {
        HolderIdentity {
            holder_id,
            active: true,
            role: Role::Student,
        }
    }

    fn service(identity: MockIdentityService) -> (ReservationsService, Repository) {
        let repository = Repository::new();
        let svc = ReservationsService::new(
            repository.clone(),
            Arc::new(identity),
            Arc::new(LendingConfig::default()),
        );
        (svc, repository)
    }

    #[tokio::test]
    async fn reserve_requires_registered_title() {
        let mut identity = MockIdentityService::new();
        identity.expect_validate().returning(|id| Ok(student(id)));
        let (svc, _repo) = service(identity);

        assert!(matches!(
            svc.reserve(1, "missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reserve_rejects_inactive_and_staff() {
        let mut identity = MockIdentityService::new();
        identity.expect_validate().returning(|id| {
            Ok(match id {
                1 => HolderIdentity { holder_id: 1, active: false, role: Role::Student },
                _ => HolderIdentity { holder_id: id, active: true, role: Role::Librarian },
            })
        });
        let (svc, repo) = service(identity);
        repo.copies.register("isbn", 1).unwrap();

        assert!(matches!(svc.reserve(1, "isbn").await, Err(AppError::Unauthorized(_))));
        assert!(matches!(svc.reserve(2, "isbn").await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn reserve_places_fifo_hold() {
        let mut identity = MockIdentityService::new();
        identity.expect_validate().returning(|id| Ok(student(id)));
        let (svc, repo) = service(identity);
        repo.copies.register("isbn", 1).unwrap();

        let first = svc.reserve(1, "isbn").await.unwrap();
        let second = svc.reserve(2, "isbn").await.unwrap();
        assert!(first.sequence < second.sequence);
        assert_eq!(repo.holds.peek_next("isbn").unwrap().holder_id, 1);
    }
}
