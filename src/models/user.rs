//! Holder identity as reported by the identity collaborator

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role; a flat enum with capability checks rather than a class
/// hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Librarian,
    Admin,
}

impl Role {
    /// Students are the only accounts that hold loans and reservations.
    pub fn can_borrow(self) -> bool {
        self == Role::Student
    }

    /// Librarians and admins perform checkouts and lost reports.
    pub fn can_approve(self) -> bool {
        matches!(self, Role::Librarian | Role::Admin)
    }
}

/// Validation result from the identity collaborator
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HolderIdentity {
    pub holder_id: i64,
    pub active: bool,
    pub role: Role,
}
