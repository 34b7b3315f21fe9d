//! In-process key-value store holding each newsletter as a JSON string,
//! the way browser local storage does.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use crate::errors::AppError;
use crate::models::Newsletter;
use crate::store::{sort_recent_first, validate_id, NewsletterStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value under `id` without validation. Used to load exported data.
    pub async fn insert_raw(&self, id: &str, json: String) {
        self.entries.write().await.insert(id.to_string(), json);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl NewsletterStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Newsletter, AppError> {
        let entries = self.entries.read().await;
        let raw = entries
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Newsletter {id} not found")))?;
        serde_json::from_str(raw).map_err(|e| {
            warn!("Stored newsletter {id} is unreadable: {e}");
            AppError::NotFound(format!("Newsletter {id} not found"))
        })
    }

    async fn put(&self, newsletter: &Newsletter) -> Result<(), AppError> {
        let id = validate_id(&newsletter.id)?.to_string();
        let json = serde_json::to_string(newsletter)?;
        self.entries.write().await.insert(id, json);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.entries.write().await.remove(id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Newsletter>, AppError> {
        let entries = self.entries.read().await;
        let mut newsletters: Vec<Newsletter> = entries
            .iter()
            .filter_map(|(id, raw)| match serde_json::from_str(raw) {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!("Skipping unreadable stored newsletter {id}: {e}");
                    None
                }
            })
            .collect();
        sort_recent_first(&mut newsletters);
        Ok(newsletters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        let newsletter = Newsletter::skeleton("Digest", &[], vec![]);

        store.put(&newsletter).await.unwrap();
        assert_eq!(store.get(&newsletter.id).await.unwrap(), newsletter);
        assert_eq!(store.len().await, 1);

        store.delete(&newsletter.id).await.unwrap();
        store.delete(&newsletter.id).await.unwrap();
        assert!(matches!(
            store.get(&newsletter.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_not_found_and_skipped() {
        let store = MemoryStore::new();
        store.insert_raw("newsletter-9", "oops".to_string()).await;
        store
            .put(&Newsletter::skeleton("Kept", &[], vec![]))
            .await
            .unwrap();

        assert!(matches!(
            store.get("newsletter-9").await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}
