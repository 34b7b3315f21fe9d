//! LLM prompt constants for grid layout suggestion.
//!
//! The prompt instructs the model to return `{"layout": [...]}` JSON only.
//! Callers deserialize via `llm.call_json::<LayoutResponse>()`.

pub const LAYOUT_SYSTEM: &str = "\
You are a newsletter layout designer. You arrange content blocks into a two-column grid, \
mixing full-width blocks with pairs of half-width blocks so the page reads well.";

pub const LAYOUT_PROMPT_TEMPLATE: &str = "\
Analyze the following newsletter content and propose a visually appealing grid layout.\n\
\n\
GRID RULES:\n\
1. The grid has 2 columns. Every block has a colspan of 1 (half width) or 2 (full width).\n\
2. Use full width for headlines, longer text sections, images, videos, tables, carousels and announcements.\n\
3. Use side-by-side half-width blocks for shorter related content: an image next to text, \
an event next to text, two related text blocks, or forms.\n\
4. The total colspan of a row must not exceed 2. Two colspan=2 blocks can never share a row.\n\
5. Spacers are always full width (colspan=2).\n\
6. Keep every block's type and content exactly as given. You may change the ORDER and the colspan only.\n\
\n\
CONTENT:\n\
\"\"\"\n\
{content}\n\
\"\"\"\n\
\n\
Return JSON only, a single flat array in reading order:\n\
{\"layout\": [{\"type\": \"text\", \"content\": \"...\", \"imageUrl\": null, \"videoUrl\": null, \"colspan\": 2}]}";
