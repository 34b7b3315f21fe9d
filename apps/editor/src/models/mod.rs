pub mod block;
pub mod newsletter;
pub mod table;

pub use block::{
    create_block, new_block_id, normalize, BlockDraft, BlockField, BlockPatch, BlockType,
    Colspan, ContentBlock,
};
pub use newsletter::{ApprovalStatus, Newsletter, Source, SourceDescriptor, SourceKind};
pub use table::TableData;
