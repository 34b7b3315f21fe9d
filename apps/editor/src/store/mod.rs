// Newsletter persistence: a JSON-file directory store and an in-memory
// key-value store with the same contract.

pub mod file;
pub mod memory;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::newsletter::DISPLAY_DATE_FORMAT;
use crate::models::Newsletter;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keyed newsletter storage. Newsletters are keyed by their id.
#[async_trait]
pub trait NewsletterStore: Send + Sync {
    /// `AppError::NotFound` when the id is unknown or its record is unreadable.
    async fn get(&self, id: &str) -> Result<Newsletter, AppError>;
    async fn put(&self, newsletter: &Newsletter) -> Result<(), AppError>;
    /// Deleting an unknown id succeeds.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Every readable newsletter, most recently updated first.
    async fn list_all(&self) -> Result<Vec<Newsletter>, AppError>;
}

/// Rejects ids that could escape a storage namespace.
pub fn validate_id(id: &str) -> Result<&str, AppError> {
    if id.is_empty()
        || id.contains(['/', '\\'])
        || id.contains("..")
        || id.chars().any(char::is_control)
    {
        return Err(AppError::Validation(format!("Invalid newsletter id '{id}'")));
    }
    Ok(id)
}

/// Most recent first. Display dates sort by calendar date; free-form labels
/// such as "2 days ago" sort after them, by text.
pub fn sort_recent_first(newsletters: &mut [Newsletter]) {
    newsletters.sort_by(|a, b| {
        let (da, db) = (parse_display_date(&a.last_updated), parse_display_date(&b.last_updated));
        match (da, db) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.last_updated.cmp(&b.last_updated),
        }
        .then_with(|| a.id.cmp(&b.id))
    });
}

fn parse_display_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DISPLAY_DATE_FORMAT).ok()
}
