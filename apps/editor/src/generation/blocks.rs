//! Source-to-blocks generation and new-newsletter assembly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{GENERATE_PROMPT_TEMPLATE, GENERATE_SYSTEM};
use crate::llm_client::prompts::{fill_template, json_system, FIDELITY_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::{new_block_id, normalize, BlockDraft, BlockType, ContentBlock, Newsletter, Source};
use crate::scanner::BLOCK_SEPARATOR;

/// Block types the generator is allowed to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratedKind {
    #[default]
    Text,
    ImageWithText,
}

impl From<GeneratedKind> for BlockType {
    fn from(kind: GeneratedKind) -> Self {
        match kind {
            GeneratedKind::Text => BlockType::Text,
            GeneratedKind::ImageWithText => BlockType::ImageWithText,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: GeneratedKind,
}

impl GeneratedBlock {
    /// A full-width block with a fresh id. No placeholder media is attached.
    pub fn into_block(self) -> ContentBlock {
        normalize(BlockDraft {
            id: new_block_id(),
            block_type: self.kind.into(),
            content: self.content,
            title: self.title.filter(|t| !t.trim().is_empty()),
            colspan: Some(2),
            ..BlockDraft::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateBlocksRequest {
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateBlocksResponse {
    #[serde(default)]
    pub blocks: Vec<GeneratedBlock>,
}

/// The text-to-blocks service.
#[async_trait]
pub trait BlockGenerator: Send + Sync {
    async fn generate_blocks(
        &self,
        request: &GenerateBlocksRequest,
    ) -> Result<GenerateBlocksResponse, AppError>;
}

#[async_trait]
impl BlockGenerator for LlmClient {
    async fn generate_blocks(
        &self,
        request: &GenerateBlocksRequest,
    ) -> Result<GenerateBlocksResponse, AppError> {
        let prompt = fill_template(
            GENERATE_PROMPT_TEMPLATE,
            &[("{fidelity}", FIDELITY_INSTRUCTION), ("{text}", request.text.as_str())],
        );
        self.call_json(&prompt, &json_system(GENERATE_SYSTEM))
            .await
            .map_err(|e| AppError::Llm(format!("Block generation failed: {e}")))
    }
}

/// `Source: <name>\n<content>` per source, joined by the block separator.
pub fn combine_sources(sources: &[Source]) -> String {
    sources
        .iter()
        .map(|s| format!("Source: {}\n{}", s.name, s.content))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Generates blocks for `sources`. Empty source text skips the service call.
pub async fn generate_from_sources(
    sources: &[Source],
    generator: &dyn BlockGenerator,
) -> Result<Vec<ContentBlock>, AppError> {
    let text = combine_sources(sources);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let response = generator
        .generate_blocks(&GenerateBlocksRequest { text })
        .await?;
    info!("Generated {} block(s) from {} source(s)", response.blocks.len(), sources.len());

    Ok(response
        .blocks
        .into_iter()
        .map(GeneratedBlock::into_block)
        .collect())
}

/// Builds a new newsletter from `sources`.
///
/// A generation failure is logged and yields the bare skeleton; it never aborts creation.
pub async fn create_newsletter(
    title: &str,
    sources: &[Source],
    generator: &dyn BlockGenerator,
) -> Newsletter {
    let body = match generate_from_sources(sources, generator).await {
        Ok(blocks) => blocks,
        Err(e) => {
            warn!("Could not generate content from sources, creating blank newsletter: {e}");
            Vec::new()
        }
    };
    Newsletter::skeleton(title, sources, body)
}
