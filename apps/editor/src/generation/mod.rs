// Newsletter generation: turns operator sources into content blocks.
// All LLM calls go through llm_client.

pub mod blocks;
pub mod prompts;

pub use blocks::{
    combine_sources, create_newsletter, generate_from_sources, BlockGenerator,
    GenerateBlocksRequest, GenerateBlocksResponse, GeneratedBlock, GeneratedKind,
};
