//! Content blocks, the unit of newsletter content.
//!
//! A block is a single struct with an explicit [`BlockType`] discriminant. Which
//! optional fields are meaningful is decided by [`BlockType::allows`]; the table is
//! enforced when a [`BlockPatch`] is merged, so a block never carries a field its
//! type does not render.
//!
//! | type              | fields beyond title/content/colspan                   |
//! |-------------------|--------------------------------------------------------|
//! | `header`          | subtitle, imageUrl, headerColor, headerTextColor       |
//! | `image-with-text` | imageUrl                                               |
//! | `video-with-text` | videoUrl                                               |
//! | `link-with-text`  | linkUrl                                                |
//! | `event`           | eventDate, eventTime, eventLocation                    |
//! | `table`           | tableData                                              |
//! | everything else   | none                                                   |

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::table::TableData;

const PLACEHOLDER_HEADER_IMAGE: &str = "https://placehold.co/1200x400";
const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400";
const PLACEHOLDER_VIDEO: &str = "https://www.w3schools.com/html/mov_bbb.mp4";
const PLACEHOLDER_LINK: &str = "https://example.com";

static BLOCK_COUNTER: AtomicU64 = AtomicU64::new(0);

// ────────────────────────────────────────────────────────────────────────────
// Discriminants
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    #[default]
    Text,
    ImageWithText,
    VideoWithText,
    LinkWithText,
    Header,
    Footer,
    Spacer,
    Table,
    Carousel,
    Event,
    Form,
    Announcement,
}

/// Optional, type-gated block fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField {
    Title,
    Subtitle,
    ImageUrl,
    VideoUrl,
    LinkUrl,
    EventDate,
    EventTime,
    EventLocation,
    TableData,
    HeaderColor,
    HeaderTextColor,
}

impl BlockType {
    pub const ALL: [BlockType; 12] = [
        BlockType::Text,
        BlockType::ImageWithText,
        BlockType::VideoWithText,
        BlockType::LinkWithText,
        BlockType::Header,
        BlockType::Footer,
        BlockType::Spacer,
        BlockType::Table,
        BlockType::Carousel,
        BlockType::Event,
        BlockType::Form,
        BlockType::Announcement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::ImageWithText => "image-with-text",
            BlockType::VideoWithText => "video-with-text",
            BlockType::LinkWithText => "link-with-text",
            BlockType::Header => "header",
            BlockType::Footer => "footer",
            BlockType::Spacer => "spacer",
            BlockType::Table => "table",
            BlockType::Carousel => "carousel",
            BlockType::Event => "event",
            BlockType::Form => "form",
            BlockType::Announcement => "announcement",
        }
    }

    /// Whether `field` is meaningful for this block type.
    pub fn allows(&self, field: BlockField) -> bool {
        use BlockField as F;
        match field {
            F::Title => true,
            F::Subtitle | F::HeaderColor | F::HeaderTextColor => *self == BlockType::Header,
            F::ImageUrl => matches!(self, BlockType::Header | BlockType::ImageWithText),
            F::VideoUrl => *self == BlockType::VideoWithText,
            F::LinkUrl => *self == BlockType::LinkWithText,
            F::EventDate | F::EventTime | F::EventLocation => *self == BlockType::Event,
            F::TableData => *self == BlockType::Table,
        }
    }

    /// Header and footer are anchored to the ends of the collection.
    pub fn is_anchor(&self) -> bool {
        matches!(self, BlockType::Header | BlockType::Footer)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Width of a block in the two-column grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub enum Colspan {
    Half,
    Full,
}

impl Colspan {
    pub fn columns(self) -> u8 {
        match self {
            Colspan::Half => 1,
            Colspan::Full => 2,
        }
    }
}

impl From<i64> for Colspan {
    /// Clamps: anything at or below 1 is half width, anything at or above 2 is full.
    fn from(value: i64) -> Self {
        if value >= 2 {
            Colspan::Full
        } else {
            Colspan::Half
        }
    }
}

impl From<Colspan> for u8 {
    fn from(colspan: Colspan) -> Self {
        colspan.columns()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Block records
// ────────────────────────────────────────────────────────────────────────────

/// Unvalidated block as it arrives from storage or a service response.
/// `colspan` may be absent or any integer; [`normalize`] settles it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDraft {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub content: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub link_url: Option<String>,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub event_location: Option<String>,
    pub table_data: Option<TableData>,
    pub header_color: Option<String>,
    pub header_text_color: Option<String>,
    pub colspan: Option<i64>,
}

/// A validated content block. Deserialisation always passes through [`normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "BlockDraft")]
pub struct ContentBlock {
    id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_data: Option<TableData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_text_color: Option<String>,
    pub colspan: Colspan,
}

impl ContentBlock {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Same block content under a fresh id.
    pub fn with_fresh_id(mut self) -> Self {
        self.id = new_block_id();
        self
    }
}

impl From<BlockDraft> for ContentBlock {
    fn from(draft: BlockDraft) -> Self {
        normalize(draft)
    }
}

/// Settles an unvalidated block. An unset colspan becomes half width; any other
/// value is clamped into {1, 2}. Pure.
pub fn normalize(draft: BlockDraft) -> ContentBlock {
    let colspan = Colspan::from(draft.colspan.unwrap_or(1));
    ContentBlock {
        id: draft.id,
        block_type: draft.block_type,
        content: draft.content,
        title: draft.title,
        subtitle: draft.subtitle,
        image_url: draft.image_url,
        video_url: draft.video_url,
        link_url: draft.link_url,
        event_date: draft.event_date,
        event_time: draft.event_time,
        event_location: draft.event_location,
        table_data: draft.table_data,
        header_color: draft.header_color,
        header_text_color: draft.header_text_color,
        colspan,
    }
}

/// Generates a block id: unix millis, a process-wide counter and a random suffix.
pub fn new_block_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let seq = BLOCK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let random = Uuid::new_v4().simple().to_string();
    format!("block-{millis}-{seq}-{}", &random[..8])
}

// ────────────────────────────────────────────────────────────────────────────
// Partial updates
// ────────────────────────────────────────────────────────────────────────────

/// Partial-field update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    pub content: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub link_url: Option<String>,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub event_location: Option<String>,
    pub table_data: Option<TableData>,
    pub header_color: Option<String>,
    pub header_text_color: Option<String>,
    pub colspan: Option<Colspan>,
}

macro_rules! merge_field {
    ($patch:expr, $block:expr, $field:ident, $kind:expr) => {
        if let Some(value) = &$patch.$field {
            if $block.block_type.allows($kind) {
                $block.$field = Some(value.clone());
            } else {
                debug!(
                    block_id = %$block.id,
                    field = ?$kind,
                    "Dropping field not valid for {} block",
                    $block.block_type
                );
            }
        }
    };
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn colspan(colspan: Colspan) -> Self {
        Self {
            colspan: Some(colspan),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the patch into `block`, dropping fields its type does not allow.
    pub fn apply(&self, block: &mut ContentBlock) {
        if let Some(content) = &self.content {
            block.content = content.clone();
        }
        if let Some(colspan) = self.colspan {
            block.colspan = colspan;
        }
        merge_field!(self, block, title, BlockField::Title);
        merge_field!(self, block, subtitle, BlockField::Subtitle);
        merge_field!(self, block, image_url, BlockField::ImageUrl);
        merge_field!(self, block, video_url, BlockField::VideoUrl);
        merge_field!(self, block, link_url, BlockField::LinkUrl);
        merge_field!(self, block, event_date, BlockField::EventDate);
        merge_field!(self, block, event_time, BlockField::EventTime);
        merge_field!(self, block, event_location, BlockField::EventLocation);
        merge_field!(self, block, table_data, BlockField::TableData);
        merge_field!(self, block, header_color, BlockField::HeaderColor);
        merge_field!(self, block, header_text_color, BlockField::HeaderTextColor);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Construction
// ────────────────────────────────────────────────────────────────────────────

/// Creates a block of `block_type` with a fresh id and the editor's defaults,
/// then overlays `overrides`.
pub fn create_block(block_type: BlockType, overrides: BlockPatch) -> ContentBlock {
    let mut block = ContentBlock {
        id: new_block_id(),
        block_type,
        content: format!("New {} block...", block_type.as_str().replace('-', " ")),
        title: None,
        subtitle: None,
        image_url: None,
        video_url: None,
        link_url: None,
        event_date: None,
        event_time: None,
        event_location: None,
        table_data: None,
        header_color: None,
        header_text_color: None,
        colspan: Colspan::Full,
    };

    match block_type {
        BlockType::Header => {
            block.content = "Newsletter Title".to_string();
            block.subtitle = Some("A catchy subtitle for your newsletter".to_string());
            block.image_url = Some(PLACEHOLDER_HEADER_IMAGE.to_string());
        }
        BlockType::ImageWithText => {
            block.image_url = Some(PLACEHOLDER_IMAGE.to_string());
        }
        BlockType::VideoWithText => {
            block.video_url = Some(PLACEHOLDER_VIDEO.to_string());
            block.content = "A short video with text.".to_string();
        }
        BlockType::LinkWithText => {
            block.link_url = Some(PLACEHOLDER_LINK.to_string());
            block.content = "Click here to learn more".to_string();
        }
        BlockType::Spacer | BlockType::Carousel => {
            block.content = String::new();
        }
        BlockType::Table => {
            block.content = "Data Table".to_string();
            block.table_data = Some(TableData::default());
        }
        BlockType::Event => {
            block.content = "Company Offsite".to_string();
            block.colspan = Colspan::Half;
            block.event_date = Some("October 26, 2023".to_string());
            block.event_time = Some("10:00 AM - 4:00 PM".to_string());
            block.event_location = Some("Virtual Event".to_string());
        }
        BlockType::Form => {
            block.content = "Sign up for our newsletter".to_string();
            block.colspan = Colspan::Half;
        }
        BlockType::Announcement => {
            block.content = "A new feature is launching next week!".to_string();
        }
        BlockType::Footer => {
            block.content = "Contact us at contact@newsflow.com".to_string();
        }
        BlockType::Text => {}
    }

    overrides.apply(&mut block);
    block
}
