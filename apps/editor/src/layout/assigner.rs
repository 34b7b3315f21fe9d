//! Layout assignment: turns the current collection into a suggested grid layout.
//!
//! Flow: partition → describe body → layout service → rebuild blocks → repair → re-anchor.
//! Header stays first and footer stays last whatever order the service returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::layout::packing::repair_layout;
use crate::layout::prompts::{LAYOUT_PROMPT_TEMPLATE, LAYOUT_SYSTEM};
use crate::llm_client::prompts::json_system;
use crate::llm_client::LlmClient;
use crate::models::{new_block_id, normalize, BlockDraft, BlockType, ContentBlock};

// ────────────────────────────────────────────────────────────────────────────
// Service contract
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBlock {
    pub content: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub colspan: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResponse {
    #[serde(default)]
    pub layout: Vec<LayoutBlock>,
}

/// The layout-suggestion service. Implemented by [`LlmClient`]; tests use fakes.
#[async_trait]
pub trait LayoutSuggester: Send + Sync {
    async fn suggest_layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, AppError>;
}

#[async_trait]
impl LayoutSuggester for LlmClient {
    async fn suggest_layout(&self, request: &LayoutRequest) -> Result<LayoutResponse, AppError> {
        let prompt = LAYOUT_PROMPT_TEMPLATE.replace("{content}", &request.content);
        self.call_json(&prompt, &json_system(LAYOUT_SYSTEM))
            .await
            .map_err(|e| AppError::Llm(format!("Failed to suggest layout: {e}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Partitioning
// ────────────────────────────────────────────────────────────────────────────

/// The first header and the first footer are anchors; everything else is body.
#[derive(Debug)]
pub struct Partition<'a> {
    pub header: Option<&'a ContentBlock>,
    pub footer: Option<&'a ContentBlock>,
    pub body: Vec<&'a ContentBlock>,
}

pub fn partition(blocks: &[ContentBlock]) -> Partition<'_> {
    let header_id = blocks
        .iter()
        .find(|b| b.block_type == BlockType::Header)
        .map(ContentBlock::id);
    let footer_id = blocks
        .iter()
        .find(|b| b.block_type == BlockType::Footer)
        .map(ContentBlock::id);

    let mut part = Partition {
        header: None,
        footer: None,
        body: Vec::new(),
    };
    for block in blocks {
        if Some(block.id()) == header_id {
            part.header = Some(block);
        } else if Some(block.id()) == footer_id {
            part.footer = Some(block);
        } else {
            part.body.push(block);
        }
    }
    part
}

/// One `Type: <type>, Content: <content>` line per body block.
pub fn describe_body(body: &[&ContentBlock]) -> String {
    body.iter()
        .map(|b| format!("Type: {}, Content: {}", b.block_type, b.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Assignment
// ────────────────────────────────────────────────────────────────────────────

/// Produces the suggested layout for `blocks`. Never mutates its input.
///
/// An empty body skips the service entirely. A failed call or an empty layout
/// is an error, so the caller keeps its collection as it was.
pub async fn assign_layout(
    blocks: &[ContentBlock],
    suggester: &dyn LayoutSuggester,
) -> Result<Vec<ContentBlock>, AppError> {
    let part = partition(blocks);

    if part.body.is_empty() {
        debug!("No body blocks; skipping layout suggestion");
        return Ok(anchored(part.header, Vec::new(), part.footer));
    }

    let request = LayoutRequest {
        content: describe_body(&part.body),
    };
    let response = suggester.suggest_layout(&request).await?;
    if response.layout.is_empty() {
        return Err(AppError::ServiceUnavailable(
            "Layout service returned no blocks".to_string(),
        ));
    }

    let mut body = rebuild_blocks(response.layout, &part.body);
    if body.is_empty() {
        return Err(AppError::ServiceUnavailable(
            "Layout service returned no body blocks".to_string(),
        ));
    }
    repair_layout(&mut body);
    info!(
        "Layout assigned: {} body blocks in, {} out",
        part.body.len(),
        body.len()
    );

    Ok(anchored(part.header, body, part.footer))
}

fn anchored(
    header: Option<&ContentBlock>,
    body: Vec<ContentBlock>,
    footer: Option<&ContentBlock>,
) -> Vec<ContentBlock> {
    header
        .cloned()
        .into_iter()
        .chain(body)
        .chain(footer.cloned())
        .collect()
}

/// Turns service blocks into content blocks under fresh ids.
///
/// Each returned block is matched to an unused original body block of the same
/// type and content so fields the service does not echo (title, table data,
/// event details) survive the round trip. An unmatched header or footer is
/// dropped: the anchors are re-attached separately.
fn rebuild_blocks(layout: Vec<LayoutBlock>, originals: &[&ContentBlock]) -> Vec<ContentBlock> {
    let mut used = vec![false; originals.len()];

    layout
        .into_iter()
        .filter_map(|lb| {
            let matched = originals.iter().enumerate().position(|(i, o)| {
                !used[i] && o.block_type == lb.block_type && o.content.trim() == lb.content.trim()
            });

            let mut block = match matched {
                Some(i) => {
                    used[i] = true;
                    originals[i].clone().with_fresh_id()
                }
                None if lb.block_type.is_anchor() => {
                    warn!("Dropping {} block echoed into the layout body", lb.block_type);
                    return None;
                }
                None => normalize(BlockDraft {
                    id: new_block_id(),
                    block_type: lb.block_type,
                    content: lb.content.clone(),
                    ..BlockDraft::default()
                }),
            };

            block.colspan = lb.colspan.into();
            if lb.image_url.is_some() && block.image_url.is_none() {
                block.image_url = lb.image_url;
            }
            if lb.video_url.is_some() && block.video_url.is_none() {
                block.video_url = lb.video_url;
            }
            Some(block)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::layout::packing::rows_are_valid;
    use crate::models::{create_block, BlockPatch, Colspan};

    /// Replays a canned response and records every request.
    struct FakeSuggester {
        response: Result<LayoutResponse, String>,
        requests: Mutex<Vec<LayoutRequest>>,
    }

    impl FakeSuggester {
        fn returning(layout: Vec<LayoutBlock>) -> Self {
            Self {
                response: Ok(LayoutResponse { layout }),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err("boom".to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LayoutSuggester for FakeSuggester {
        async fn suggest_layout(
            &self,
            request: &LayoutRequest,
        ) -> Result<LayoutResponse, AppError> {
            self.requests.lock().unwrap().push(request.clone());
            self.response.clone().map_err(AppError::Llm)
        }
    }

    fn lb(block_type: BlockType, content: &str, colspan: i64) -> LayoutBlock {
        LayoutBlock {
            content: content.to_string(),
            block_type,
            image_url: None,
            video_url: None,
            colspan,
        }
    }

    fn newsletter_blocks() -> Vec<ContentBlock> {
        vec![
            create_block(BlockType::Header, BlockPatch::content("Title")),
            create_block(
                BlockType::Text,
                BlockPatch {
                    title: Some("Intro".into()),
                    ..BlockPatch::content("Welcome")
                },
            ),
            create_block(BlockType::Event, BlockPatch::content("Offsite")),
            create_block(BlockType::Footer, BlockPatch::content("Bye")),
        ]
    }

    #[tokio::test]
    async fn test_empty_body_skips_service() {
        let blocks = vec![
            create_block(BlockType::Header, BlockPatch::default()),
            create_block(BlockType::Footer, BlockPatch::default()),
        ];
        let suggester = FakeSuggester::returning(vec![lb(BlockType::Text, "x", 2)]);

        let result = assign_layout(&blocks, &suggester).await.unwrap();
        assert_eq!(result, blocks);
        assert_eq!(suggester.calls(), 0);
    }

    #[tokio::test]
    async fn test_header_first_footer_last_regardless_of_response() {
        let blocks = newsletter_blocks();
        let suggester = FakeSuggester::returning(vec![
            lb(BlockType::Event, "Offsite", 1),
            lb(BlockType::Text, "Welcome", 1),
        ]);

        let result = assign_layout(&blocks, &suggester).await.unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result[0], blocks[0]);
        assert_eq!(result[3], blocks[3]);
        assert_eq!(result[1].block_type, BlockType::Event);
        assert_eq!(result[2].content, "Welcome");
    }

    #[tokio::test]
    async fn test_body_blocks_get_fresh_ids_and_keep_fields() {
        let blocks = newsletter_blocks();
        let suggester = FakeSuggester::returning(vec![
            lb(BlockType::Text, "Welcome", 1),
            lb(BlockType::Event, "Offsite", 1),
        ]);

        let result = assign_layout(&blocks, &suggester).await.unwrap();
        assert_ne!(result[1].id(), blocks[1].id());
        assert_eq!(result[1].title.as_deref(), Some("Intro"));
        assert!(result[2].event_location.is_some());
        assert_eq!(result[1].colspan, Colspan::Half);
        assert_eq!(result[2].colspan, Colspan::Half);
    }

    #[tokio::test]
    async fn test_request_describes_body_only() {
        let blocks = newsletter_blocks();
        let suggester = FakeSuggester::returning(vec![lb(BlockType::Text, "Welcome", 2)]);
        assign_layout(&blocks, &suggester).await.unwrap();

        let requests = suggester.requests.lock().unwrap();
        assert_eq!(
            requests[0].content,
            "Type: text, Content: Welcome\n\nType: event, Content: Offsite"
        );
    }

    #[tokio::test]
    async fn test_empty_layout_is_failure() {
        let blocks = newsletter_blocks();
        let suggester = FakeSuggester::returning(vec![]);
        let result = assign_layout(&blocks, &suggester).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_service_error_propagates() {
        let blocks = newsletter_blocks();
        let result = assign_layout(&blocks, &FakeSuggester::failing()).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_malformed_response_is_repaired() {
        let blocks = newsletter_blocks();
        let suggester = FakeSuggester::returning(vec![
            lb(BlockType::Spacer, "", 1),
            lb(BlockType::Text, "Welcome", 5),
            lb(BlockType::Event, "Offsite", 1),
        ]);

        let result = assign_layout(&blocks, &suggester).await.unwrap();
        assert!(rows_are_valid(&result));
        assert_eq!(result[1].colspan, Colspan::Full);
        assert_eq!(result[2].colspan, Colspan::Full);
        // lone half-width event widened
        assert_eq!(result[3].colspan, Colspan::Full);
    }

    #[tokio::test]
    async fn test_echoed_anchors_are_not_duplicated() {
        let blocks = newsletter_blocks();
        let suggester = FakeSuggester::returning(vec![
            lb(BlockType::Header, "Title", 2),
            lb(BlockType::Text, "Welcome", 1),
            lb(BlockType::Event, "Offsite", 1),
            lb(BlockType::Footer, "Bye", 2),
        ]);

        let result = assign_layout(&blocks, &suggester).await.unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result[0], blocks[0]);
        assert_eq!(result[3], blocks[3]);
        let anchors = result.iter().filter(|b| b.block_type.is_anchor()).count();
        assert_eq!(anchors, 2);
    }

    #[tokio::test]
    async fn test_body_header_survives_layout() {
        let blocks = vec![
            create_block(BlockType::Header, BlockPatch::content("H1")),
            create_block(BlockType::Header, BlockPatch::content("H2")),
            create_block(BlockType::Footer, BlockPatch::content("F")),
        ];
        let suggester = FakeSuggester::returning(vec![lb(BlockType::Header, "H2", 2)]);

        let result = assign_layout(&blocks, &suggester).await.unwrap();
        let contents: Vec<_> = result.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["H1", "H2", "F"]);
    }

    #[tokio::test]
    async fn test_only_anchors_in_layout_is_failure() {
        let blocks = newsletter_blocks();
        let suggester = FakeSuggester::returning(vec![lb(BlockType::Footer, "Bye", 2)]);
        let result = assign_layout(&blocks, &suggester).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[test]
    fn test_partition_keeps_extra_anchors_in_body() {
        let blocks = vec![
            create_block(BlockType::Header, BlockPatch::content("H1")),
            create_block(BlockType::Header, BlockPatch::content("H2")),
            create_block(BlockType::Footer, BlockPatch::content("F")),
        ];
        let part = partition(&blocks);
        assert_eq!(part.header.unwrap().content, "H1");
        assert_eq!(part.body.len(), 1);
        assert_eq!(part.body[0].content, "H2");
    }

    #[test]
    fn test_layout_response_missing_layout_is_empty() {
        let parsed: LayoutResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.layout.is_empty());
    }
}
