//! Copy ledger record: authoritative physical copy counts per title

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Availability status of a title's copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CopyStatus {
    Available,
    Unavailable,
    Lost,
    Maintenance,
}

/// Physical copy accounting for one title.
///
/// Invariant: `0 <= available_copies <= total_copies` at all times. The
/// counts move only through the ledger operations in `repository::copies`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CopyRecord {
    /// Unique catalog key (ISBN in the reference catalog)
    pub title_key: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub status: CopyStatus,
}

impl CopyRecord {
    pub fn new(title_key: impl Into<String>, total_copies: u32) -> Self {
        let mut record = Self {
            title_key: title_key.into(),
            total_copies,
            available_copies: total_copies,
            status: CopyStatus::Available,
        };
        record.refresh_status();
        record
    }

    /// Recompute the status from the counts. MAINTENANCE is pinned by the
    /// catalog and survives count changes until explicitly cleared.
    pub fn refresh_status(&mut self) {
        if self.status == CopyStatus::Maintenance {
            return;
        }
        self.status = Self::derived_status(self.total_copies, self.available_copies);
    }

    pub fn derived_status(total: u32, available: u32) -> CopyStatus {
        if total == 0 {
            CopyStatus::Lost
        } else if available == 0 {
            CopyStatus::Unavailable
        } else {
            CopyStatus::Available
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_counts() {
        assert_eq!(CopyRecord::derived_status(0, 0), CopyStatus::Lost);
        assert_eq!(CopyRecord::derived_status(3, 0), CopyStatus::Unavailable);
        assert_eq!(CopyRecord::derived_status(3, 1), CopyStatus::Available);
    }

    #[test]
    fn maintenance_is_pinned() {
        let mut record = CopyRecord::new("978-0-00", 2);
        record.status = CopyStatus::Maintenance;
        record.available_copies = 0;
        record.refresh_status();
        assert_eq!(record.status, CopyStatus::Maintenance);
    }
}
