use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::block::{create_block, BlockPatch, BlockType, Colspan, ContentBlock};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    #[default]
    Draft,
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Draft => "Draft",
            ApprovalStatus::PendingApproval => "Pending Approval",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    File,
    Link,
    Text,
    Gdrive,
    Image,
}

/// A content source as supplied by the operator, before ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub content: String,
}

/// What a newsletter remembers about a source once its content has been ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

impl From<&Source> for SourceDescriptor {
    fn from(source: &Source) -> Self {
        Self {
            name: source.name.clone(),
            kind: source.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Newsletter {
    pub id: String,
    pub title: String,
    pub last_updated: String,
    #[serde(default)]
    pub status: ApprovalStatus,
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub sources: Vec<SourceDescriptor>,
}

impl Newsletter {
    /// A new newsletter: header, then `body` forced to full width, then footer.
    pub fn skeleton(title: &str, sources: &[Source], body: Vec<ContentBlock>) -> Self {
        let now = Utc::now();
        let title = title.trim();

        let header = create_block(
            BlockType::Header,
            BlockPatch {
                title: Some("Header".to_string()),
                subtitle: Some("A great start!".to_string()),
                ..BlockPatch::content(if title.is_empty() {
                    "Your New Newsletter"
                } else {
                    title
                })
            },
        );
        let footer = create_block(
            BlockType::Footer,
            BlockPatch {
                title: Some("Footer".to_string()),
                ..BlockPatch::content(format!(
                    "© {} Newsflow. All rights reserved. | Contact us at contact@newsflow.com",
                    now.year()
                ))
            },
        );

        let mut blocks = Vec::with_capacity(body.len() + 2);
        blocks.push(header);
        blocks.extend(body.into_iter().map(|mut b| {
            b.colspan = Colspan::Full;
            b
        }));
        blocks.push(footer);

        Self {
            id: format!("newsletter-{}", now.timestamp_millis()),
            title: if title.is_empty() {
                "Untitled Newsletter".to_string()
            } else {
                title.to_string()
            },
            last_updated: display_date(now),
            status: ApprovalStatus::Draft,
            blocks,
            sources: sources.iter().map(SourceDescriptor::from).collect(),
        }
    }

    pub fn header(&self) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.block_type == BlockType::Header)
    }

    pub fn footer(&self) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.block_type == BlockType::Footer)
    }

    pub fn block(&self, id: &str) -> Option<&ContentBlock> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    /// Refreshes the display date shown in listings.
    pub fn touch(&mut self) {
        self.last_updated = display_date(Utc::now());
    }

    /// Short preview for listings: first text block, else first block.
    pub fn excerpt(&self) -> &str {
        self.blocks
            .iter()
            .find(|b| b.block_type == BlockType::Text)
            .or_else(|| self.blocks.first())
            .map(|b| b.content.as_str())
            .unwrap_or("No content yet.")
    }
}

/// Month name, unpadded day and year, e.g. "October 17, 2026".
pub const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y";

pub fn display_date(at: DateTime<Utc>) -> String {
    at.format(DISPLAY_DATE_FORMAT).to_string()
}
