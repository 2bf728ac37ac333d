//! Reservation queue: fair FIFO ordering of waiting holders per title

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{HoldStatus, ReservationHold},
};

struct QueueState {
    /// Per-title holds in insertion order; insertion order is the FIFO order
    /// and matches the monotonic sequence numbers
    titles: HashMap<String, IndexMap<Uuid, ReservationHold>>,
    /// Hold id -> title key, for id-addressed lookups
    index: HashMap<Uuid, String>,
    next_sequence: u64,
}

/// Per-title FIFO of reservation holds.
///
/// Holds transition between states and are never removed, so cancelled and
/// expired entries stay visible in listings as an audit trail.
pub struct ReservationQueue {
    state: RwLock<QueueState>,
}

impl ReservationQueue {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(QueueState {
                titles: HashMap::new(),
                index: HashMap::new(),
                next_sequence: 0,
            }),
        }
    }

    /// Append a hold at the tail of the title's queue.
    ///
    /// `Conflict` if the holder already waits on this title, `QuotaExceeded`
    /// past `max_holds` active holds across all titles.
    pub fn place(
        &self,
        holder_id: i64,
        title_key: &str,
        now: DateTime<Utc>,
        expiry_days: i64,
        max_holds: usize,
    ) -> AppResult<ReservationHold> {
        let mut state = self.state.write().expect("reservation queue poisoned");

        let duplicate = state
            .titles
            .get(title_key)
            .map(|queue| {
                queue
                    .values()
                    .any(|h| h.holder_id == holder_id && h.status.is_active())
            })
            .unwrap_or(false);
        if duplicate {
            return Err(AppError::Conflict(format!(
                "Holder {} already has an active hold on {}",
                holder_id, title_key
            )));
        }

        let active_count = state
            .titles
            .values()
            .flat_map(|queue| queue.values())
            .filter(|h| h.holder_id == holder_id && h.status.is_active())
            .count();
        if active_count >= max_holds {
            return Err(AppError::QuotaExceeded(format!(
                "Holder {} has reached the maximum of {} active holds",
                holder_id, max_holds
            )));
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let hold = ReservationHold {
            id: Uuid::new_v4(),
            holder_id,
            title_key: title_key.to_string(),
            placed_at: now,
            expires_at: now + Duration::days(expiry_days),
            sequence,
            status: HoldStatus::Active,
        };

        state.index.insert(hold.id, title_key.to_string());
        state
            .titles
            .entry(title_key.to_string())
            .or_default()
            .insert(hold.id, hold.clone());

        Ok(hold)
    }

    /// The active hold with the earliest placement for the title, if any.
    /// FIFO by `placed_at`, insertion sequence breaking timestamp ties.
    pub fn peek_next(&self, title_key: &str) -> Option<ReservationHold> {
        let state = self.state.read().expect("reservation queue poisoned");
        state.titles.get(title_key).and_then(|queue| {
            queue
                .values()
                .filter(|h| h.status.is_active())
                .min_by_key(|h| (h.placed_at, h.sequence))
                .cloned()
        })
    }

    /// True when a just-freed copy must not go to this holder because someone
    /// else is at the head of the queue.
    pub fn is_blocking(&self, title_key: &str, holder_id: i64) -> bool {
        self.peek_next(title_key)
            .map(|head| head.holder_id != holder_id)
            .unwrap_or(false)
    }

    /// Transition the holder's active hold on this title to FULFILLED.
    /// A no-op when the holder had no hold; checkout does not require one.
    pub fn fulfill(&self, holder_id: i64, title_key: &str) -> Option<ReservationHold> {
        let mut state = self.state.write().expect("reservation queue poisoned");
        let queue = state.titles.get_mut(title_key)?;
        let hold = queue
            .values_mut()
            .find(|h| h.holder_id == holder_id && h.status.is_active())?;
        hold.status = HoldStatus::Fulfilled;
        Some(hold.clone())
    }

    /// Holder-initiated cancellation
    pub fn cancel(&self, hold_id: Uuid, holder_id: i64) -> AppResult<ReservationHold> {
        let mut state = self.state.write().expect("reservation queue poisoned");
        let title_key = state
            .index
            .get(&hold_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", hold_id)))?;
        let hold = state
            .titles
            .get_mut(&title_key)
            .and_then(|queue| queue.get_mut(&hold_id))
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", hold_id)))?;

        if hold.holder_id != holder_id {
            return Err(AppError::Unauthorized(
                "Reservation does not belong to this holder".to_string(),
            ));
        }
        if !hold.status.is_active() {
            return Err(AppError::Conflict(
                "Only active reservations can be cancelled".to_string(),
            ));
        }
        hold.status = HoldStatus::Cancelled;
        Ok(hold.clone())
    }

    /// Expire every active hold whose window has lapsed. Idempotent: each
    /// hold leaves ACTIVE at most once, so reruns and concurrent sweeps only
    /// touch holds still eligible at the moment of update.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<ReservationHold> {
        let mut state = self.state.write().expect("reservation queue poisoned");
        let mut expired = Vec::new();
        for queue in state.titles.values_mut() {
            for hold in queue.values_mut() {
                if hold.status.is_active() && hold.expires_at < now {
                    hold.status = HoldStatus::Expired;
                    expired.push(hold.clone());
                }
            }
        }
        expired
    }

    /// Queue contents for a title, FIFO order, all states
    pub fn list_for_title(&self, title_key: &str) -> Vec<ReservationHold> {
        let state = self.state.read().expect("reservation queue poisoned");
        let mut holds: Vec<ReservationHold> = state
            .titles
            .get(title_key)
            .map(|queue| queue.values().cloned().collect())
            .unwrap_or_default();
        holds.sort_by_key(|h| (h.placed_at, h.sequence));
        holds
    }

    pub fn list_for_holder(&self, holder_id: i64) -> Vec<ReservationHold> {
        let state = self.state.read().expect("reservation queue poisoned");
        let mut holds: Vec<ReservationHold> = state
            .titles
            .values()
            .flat_map(|queue| queue.values())
            .filter(|h| h.holder_id == holder_id)
            .cloned()
            .collect();
        holds.sort_by_key(|h| (h.placed_at, h.sequence));
        holds
    }
}

impl Default for ReservationQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> ReservationQueue {
        ReservationQueue::new()
    }

    #[test]
    fn fifo_order_with_tie_break() {
        let q = queue();
        let now = Utc::now();
        // Same timestamp: sequence decides
        let first = q.place(1, "isbn", now, 7, 5).unwrap();
        let second = q.place(2, "isbn", now, 7, 5).unwrap();
        assert!(first.sequence < second.sequence);
        assert_eq!(q.peek_next("isbn").unwrap().holder_id, 1);
        q.fulfill(1, "isbn");
        assert_eq!(q.peek_next("isbn").unwrap().holder_id, 2);
    }

    #[test]
    fn duplicate_hold_rejected() {
        let q = queue();
        q.place(1, "isbn", Utc::now(), 7, 5).unwrap();
        assert!(matches!(
            q.place(1, "isbn", Utc::now(), 7, 5),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn global_quota_enforced() {
        let q = queue();
        let now = Utc::now();
        for i in 0..5 {
            q.place(1, &format!("isbn-{}", i), now, 7, 5).unwrap();
        }
        assert!(matches!(
            q.place(1, "isbn-5", now, 7, 5),
            Err(AppError::QuotaExceeded(_))
        ));
        // Cancelled holds free the quota slot
        let holds = q.list_for_holder(1);
        q.cancel(holds[0].id, 1).unwrap();
        q.place(1, "isbn-5", now, 7, 5).unwrap();
    }

    #[test]
    fn blocking_only_for_other_holders() {
        let q = queue();
        assert!(!q.is_blocking("isbn", 1));
        q.place(2, "isbn", Utc::now(), 7, 5).unwrap();
        assert!(q.is_blocking("isbn", 1));
        assert!(!q.is_blocking("isbn", 2));
    }

    #[test]
    fn fulfill_without_hold_is_noop() {
        let q = queue();
        assert!(q.fulfill(1, "isbn").is_none());
    }

    #[test]
    fn cancel_checks_owner_and_state() {
        let q = queue();
        let hold = q.place(1, "isbn", Utc::now(), 7, 5).unwrap();
        assert!(matches!(q.cancel(hold.id, 2), Err(AppError::Unauthorized(_))));
        q.cancel(hold.id, 1).unwrap();
        assert!(matches!(q.cancel(hold.id, 1), Err(AppError::Conflict(_))));
    }

    #[test]
    fn sweep_expired_is_idempotent() {
        let q = queue();
        let placed = Utc::now() - Duration::days(8);
        q.place(1, "isbn", placed, 7, 5).unwrap();
        q.place(2, "isbn", Utc::now(), 7, 5).unwrap();

        let expired = q.sweep_expired(Utc::now());
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].holder_id, 1);
        assert!(q.sweep_expired(Utc::now()).is_empty());
        // Expired holds no longer block
        assert_eq!(q.peek_next("isbn").unwrap().holder_id, 2);
    }
}
