//! Confidentiality scan contract, serialisation and result resolution.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::models::ContentBlock;
use crate::scanner::prompts::{quote_keywords, SCAN_PROMPT_TEMPLATE, SCAN_SYSTEM};

/// Separator between serialised blocks in a scan request.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";
const ID_PREFIX: &str = "id: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub newsletter_content: String,
    pub sensitive_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedItem {
    pub keyword: String,
    pub sentence: String,
    pub block_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    #[serde(default)]
    pub flagged_items: Vec<FlaggedItem>,
    #[serde(default)]
    pub is_confidential: bool,
}

/// A keyword match tied to a block, ready for display. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedIssue {
    pub keyword: String,
    pub block_id: String,
    pub block_title: Option<String>,
}

/// Result of one dispatched scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Completed(ScanResponse),
    Failed(String),
}

impl ScanOutcome {
    pub fn is_confidential(&self) -> bool {
        matches!(self, ScanOutcome::Completed(r) if r.is_confidential)
    }

    pub fn flagged_items(&self) -> &[FlaggedItem] {
        match self {
            ScanOutcome::Completed(r) => &r.flagged_items,
            ScanOutcome::Failed(_) => &[],
        }
    }
}

/// The text-classification service.
#[async_trait]
pub trait ConfidentialityClassifier: Send + Sync {
    async fn classify(&self, request: &ScanRequest) -> Result<ScanResponse, AppError>;
}

#[async_trait]
impl ConfidentialityClassifier for LlmClient {
    async fn classify(&self, request: &ScanRequest) -> Result<ScanResponse, AppError> {
        let keywords = quote_keywords(&request.sensitive_keywords);
        let prompt = fill_template(
            SCAN_PROMPT_TEMPLATE,
            &[
                ("{keywords}", keywords.as_str()),
                ("{content}", request.newsletter_content.as_str()),
            ],
        );
        self.call_json(&prompt, &json_system(SCAN_SYSTEM))
            .await
            .map_err(|e| AppError::Llm(format!("Confidentiality check failed: {e}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Serialisation
// ────────────────────────────────────────────────────────────────────────────

/// `id: <blockId>\n<content>` per block, joined by [`BLOCK_SEPARATOR`].
pub fn serialize_blocks(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .map(|b| format!("{ID_PREFIX}{}\n{}", b.id(), b.content))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Inverse of [`serialize_blocks`]: `(block_id, content)` pairs.
///
/// A chunk without an `id: ` line is a separator inside block content, so it
/// stays part of the preceding block.
pub fn parse_serialized(content: &str) -> Vec<(&str, &str)> {
    let mut spans: Vec<(&str, usize, usize)> = Vec::new();
    let mut offset = 0;

    for chunk in content.split(BLOCK_SEPARATOR) {
        let end = offset + chunk.len();
        match chunk.strip_prefix(ID_PREFIX) {
            Some(rest) => {
                let (id, body_start) = match rest.find('\n') {
                    Some(i) => (&rest[..i], offset + ID_PREFIX.len() + i + 1),
                    None => (rest, end),
                };
                spans.push((id.trim(), body_start, end));
            }
            None => {
                if let Some(last) = spans.last_mut() {
                    last.2 = end;
                }
            }
        }
        offset = end + BLOCK_SEPARATOR.len();
    }

    spans
        .into_iter()
        .map(|(id, start, end)| (id, &content[start..end]))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatch and resolution
// ────────────────────────────────────────────────────────────────────────────

/// Runs one scan. A failed call is reported as [`ScanOutcome::Failed`], never raised.
pub async fn run_scan(
    classifier: &dyn ConfidentialityClassifier,
    keywords: &[String],
    blocks: &[ContentBlock],
) -> ScanOutcome {
    let request = ScanRequest {
        newsletter_content: serialize_blocks(blocks),
        sensitive_keywords: keywords.to_vec(),
    };

    match classifier.classify(&request).await {
        Ok(response) => {
            info!(
                "Confidentiality scan: {} flagged item(s), confidential={}",
                response.flagged_items.len(),
                response.is_confidential
            );
            ScanOutcome::Completed(response)
        }
        Err(e) => {
            warn!(code = e.code(), "Confidentiality scan failed: {e}");
            ScanOutcome::Failed(e.user_message())
        }
    }
}

/// De-duplicates matches by (keyword, block) and joins each to the live block title.
///
/// A match whose block has since been removed keeps its place with no title.
pub fn resolve_issues(items: &[FlaggedItem], blocks: &[ContentBlock]) -> Vec<FlaggedIssue> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert((item.keyword.to_lowercase(), item.block_id.clone())))
        .map(|item| FlaggedIssue {
            keyword: item.keyword.clone(),
            block_id: item.block_id.clone(),
            block_title: blocks
                .iter()
                .find(|b| b.id() == item.block_id)
                .and_then(|b| b.title.clone()),
        })
        .collect()
}
