//! Data models for Stacks

pub mod copy_record;
pub mod hold;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use copy_record::{CopyRecord, CopyStatus};
pub use hold::{HoldStatus, ReservationHold};
pub use loan::{Loan, LoanStatus};
pub use user::{HolderIdentity, Role};
