//! Approval workflow shared by sales and expenses.

use super::macros::define_code_enum;
use super::normalize_optional_text;

define_code_enum! {
    /// Where a sale or expense is in the approval workflow.
    pub enum ReviewStatus / ParseReviewStatusError ("review status") {
        /// Awaiting a manager.
        Pending => "pending",
        /// Accepted; money movements were recorded.
        Approved => "approved",
        /// Refused, with a reason.
        Rejected => "rejected",
    }
}

/// Raised when a record has already left the pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("record is {status}; only pending records can be changed")]
pub struct NotPendingError {
    /// Current status.
    pub status: ReviewStatus,
}

impl ReviewStatus {
    /// Fail unless still pending.
    pub fn ensure_pending(self) -> Result<(), NotPendingError> {
        if self == Self::Pending {
            Ok(())
        } else {
            Err(NotPendingError { status: self })
        }
    }
}

/// Raised when a rejection carries no reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a rejection reason is required")]
pub struct MissingReasonError;

/// Trim a rejection reason and require it.
pub fn require_reason(raw: &str) -> Result<String, MissingReasonError> {
    normalize_optional_text(Some(raw)).ok_or(MissingReasonError)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ReviewStatus::Pending, true)]
    #[case(ReviewStatus::Approved, false)]
    #[case(ReviewStatus::Rejected, false)]
    fn only_pending_records_are_mutable(#[case] status: ReviewStatus, #[case] mutable: bool) {
        assert_eq!(status.ensure_pending().is_ok(), mutable);
    }

    #[rstest]
    fn blank_reasons_are_refused() {
        assert_eq!(require_reason("  "), Err(MissingReasonError));
        assert_eq!(require_reason(" stale ").as_deref(), Ok("stale"));
    }
}
