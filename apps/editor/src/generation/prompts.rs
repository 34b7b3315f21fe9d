// LLM prompt constants for block generation.
// Reuses cross-cutting fragments from llm_client::prompts.

pub const GENERATE_SYSTEM: &str = "\
You are an expert content strategist for an internal company newsletter. \
You turn raw source material into a sequence of well-structured content blocks.";

/// Block generation prompt. Replace `{text}` and `{fidelity}` before sending.
pub const GENERATE_PROMPT_TEMPLATE: &str = r#"Analyze the raw text below and structure it into a series of logical content blocks for a newsletter.

Rules:
1. Read through the entire text.
2. Identify natural sections, headings and paragraphs.
3. Create one block per section.
4. Use a clear heading from the text as the block "title". Omit "title" when a paragraph has no heading.
5. "content" is the main paragraph text of the section.
6. "type" is "text". Use "image-with-text" only when the text strongly implies a visual (for example "the chart shows..." or "in the photo...").
7. Do not create blocks for source markers such as "Source: report.pdf".

{fidelity}

RAW TEXT:
"""
{text}
"""

Return JSON only:
{"blocks": [{"title": "optional heading", "content": "paragraph text", "type": "text"}]}"#;
