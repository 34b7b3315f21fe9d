//! Chat-based editing assistant. Replies carry suggestions only; the session
//! applies them when the operator accepts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant::prompts::{CHAT_PROMPT_TEMPLATE, CHAT_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::models::{Colspan, ContentBlock};

const EMPTY_CONTEXT: &str = "(the newsletter is empty)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    pub block_id: String,
    pub new_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColspanSuggestion {
    pub block_id: String,
    pub colspan: Colspan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Replacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_suggestion: Option<Vec<ColspanSuggestion>>,
}

#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, AppError>;
}

#[async_trait]
impl ChatAssistant for LlmClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, AppError> {
        let reply: ChatReply = self
            .call_json(&chat_prompt(request), &json_system(CHAT_SYSTEM))
            .await
            .map_err(|e| AppError::Llm(format!("Chat failed: {e}")))?;

        info!(
            has_replacement = reply.replacement.is_some(),
            has_layout = reply.layout_suggestion.is_some(),
            "Chat reply received"
        );
        Ok(reply)
    }
}

fn chat_prompt(request: &ChatRequest) -> String {
    fill_template(
        CHAT_PROMPT_TEMPLATE,
        &[
            ("{context}", request.context.as_deref().unwrap_or(EMPTY_CONTEXT)),
            ("{prompt}", request.prompt.as_str()),
        ],
    )
}

/// `blockId: <id>\ntype: <type>\ncontent: <content>` per block, blank-line separated.
pub fn build_context(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .map(|b| {
            format!(
                "blockId: {}\ntype: {}\ncontent: {}",
                b.id(),
                b.block_type,
                b.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A request carrying the current blocks as context.
pub fn chat_request(prompt: &str, blocks: &[ContentBlock]) -> ChatRequest {
    ChatRequest {
        prompt: prompt.to_string(),
        context: (!blocks.is_empty()).then(|| build_context(blocks)),
    }
}
