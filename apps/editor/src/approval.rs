//! Approval workflow: legal status transitions and the approval-request notifier.

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::models::{ApprovalStatus, Newsletter};

/// Checks that `from -> to` is a legal move.
///
/// Draft goes to review, review ends approved or rejected, and a decided
/// newsletter can be reopened as a draft.
pub fn transition(from: ApprovalStatus, to: ApprovalStatus) -> Result<ApprovalStatus, AppError> {
    use ApprovalStatus::*;

    match (from, to) {
        (Draft, PendingApproval)
        | (PendingApproval, Approved)
        | (PendingApproval, Rejected)
        | (Approved, Draft)
        | (Rejected, Draft) => Ok(to),
        _ => Err(AppError::Validation(format!(
            "Cannot move a newsletter from '{}' to '{}'",
            from.as_str(),
            to.as_str()
        ))),
    }
}

/// Where operators review a newsletter before approving it.
pub fn preview_path(newsletter_id: &str) -> String {
    format!("/newsletters/{newsletter_id}/preview")
}

/// Delivers an approval request to a reviewer.
#[async_trait]
pub trait ApprovalNotifier: Send + Sync {
    async fn request_approval(&self, recipient: &str, newsletter: &Newsletter)
        -> Result<(), AppError>;
}

/// Writes the request to the log instead of sending mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl ApprovalNotifier for LogNotifier {
    async fn request_approval(
        &self,
        recipient: &str,
        newsletter: &Newsletter,
    ) -> Result<(), AppError> {
        info!(
            recipient,
            newsletter_id = %newsletter.id,
            title = %newsletter.title,
            preview = %preview_path(&newsletter.id),
            "Approval requested"
        );
        Ok(())
    }
}

/// Rejects recipients that cannot be an email address.
pub fn validate_recipient(recipient: &str) -> Result<&str, AppError> {
    let recipient = recipient.trim();
    match recipient.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(recipient),
        _ => Err(AppError::Validation(format!(
            "'{recipient}' is not a valid email address"
        ))),
    }
}
