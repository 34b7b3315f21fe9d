use std::sync::Arc;

use tracing::info;

use crate::approval::{ApprovalNotifier, LogNotifier};
use crate::config::Config;
use crate::errors::AppError;
use crate::generation::create_newsletter;
use crate::llm_client::{self, LlmClient};
use crate::models::{Newsletter, Source};
use crate::scanner::{ConfidentialityClassifier, ScanScheduler};
use crate::session::EditingSession;
use crate::store::{FileStore, NewsletterStore};

/// Shared services a host wires once and hands to every editing session.
#[derive(Clone)]
pub struct EditorState {
    pub config: Config,
    /// Serves layout, generation, extraction and chat.
    pub llm: Arc<LlmClient>,
    pub store: Arc<dyn NewsletterStore>,
    /// Pluggable classifier. Default: the model; `KeywordClassifier` works offline.
    pub classifier: Arc<dyn ConfidentialityClassifier>,
    pub notifier: Arc<dyn ApprovalNotifier>,
}

impl EditorState {
    /// Opens the seeded file store under `config.data_dir` and builds the model client.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let store = FileStore::open_seeded(&config.data_dir).await?;

        let llm = Arc::new(LlmClient::new(
            config.anthropic_api_key.clone(),
            config.llm_timeout,
        )?);
        info!("LLM client initialized (model: {})", llm_client::MODEL);

        Ok(Self {
            classifier: llm.clone(),
            llm,
            store: Arc::new(store),
            notifier: Arc::new(LogNotifier),
            config,
        })
    }

    /// A scheduler using the configured classifier, keywords and quiescence window.
    pub fn scan_scheduler(&self) -> Arc<ScanScheduler> {
        Arc::new(ScanScheduler::new(
            Arc::clone(&self.classifier),
            self.config.sensitive_keywords.clone(),
            self.config.scan_debounce,
        ))
    }

    /// Opens a stored newsletter with scanning attached. Must be called inside a tokio runtime.
    pub async fn open_session(&self, id: &str) -> Result<EditingSession, AppError> {
        let session = EditingSession::open(self.store.as_ref(), id).await?;
        Ok(session.with_scanner(self.scan_scheduler()))
    }

    /// Generates, stores and returns a new newsletter built from `sources`.
    pub async fn create_newsletter(
        &self,
        title: &str,
        sources: &[Source],
    ) -> Result<Newsletter, AppError> {
        let newsletter = create_newsletter(title, sources, self.llm.as_ref()).await;
        self.store.put(&newsletter).await?;
        info!(
            "Created newsletter {} with {} block(s)",
            newsletter.id,
            newsletter.blocks.len()
        );
        Ok(newsletter)
    }
}
