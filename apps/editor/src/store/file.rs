//! One pretty-printed `<id>.json` file per newsletter under a data directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::fixtures::sample_newsletters;
use crate::models::Newsletter;
use crate::store::{sort_recent_first, validate_id, NewsletterStore};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens `dir`, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!("Newsletter store opened at {}", dir.display());
        Ok(Self { dir })
    }

    /// Opens `dir` and writes each sample newsletter whose file is missing.
    pub async fn open_seeded(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = Self::open(dir).await?;
        for sample in sample_newsletters()? {
            let path = store.path_for(&sample.id)?;
            if !fs::try_exists(&path).await? {
                store.put(&sample).await?;
                info!("Seeded sample newsletter {}", sample.id);
            }
        }
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, AppError> {
        Ok(self.dir.join(format!("{}.json", validate_id(id)?)))
    }
}

#[async_trait]
impl NewsletterStore for FileStore {
    async fn get(&self, id: &str) -> Result<Newsletter, AppError> {
        let path = self.path_for(id)?;
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("Newsletter {id} not found")))
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("Newsletter file {} is not UTF-8: {e}", path.display());
                return Err(AppError::NotFound(format!("Newsletter {id} not found")));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| {
            warn!("Newsletter file {} is unreadable: {e}", path.display());
            AppError::NotFound(format!("Newsletter {id} not found"))
        })
    }

    async fn put(&self, newsletter: &Newsletter) -> Result<(), AppError> {
        let path = self.path_for(&newsletter.id)?;
        let json = serde_json::to_string_pretty(newsletter)?;
        fs::write(&path, json).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<Newsletter>, AppError> {
        let mut newsletters = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = match fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!("Skipping non-UTF-8 newsletter file {}: {e}", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            match serde_json::from_str::<Newsletter>(&raw) {
                Ok(newsletter) => newsletters.push(newsletter),
                Err(e) => warn!("Skipping unreadable newsletter file {}: {e}", path.display()),
            }
        }

        sort_recent_first(&mut newsletters);
        Ok(newsletters)
    }
}
