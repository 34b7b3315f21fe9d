// LLM prompt constants for the editing assistant.

pub const CHAT_SYSTEM: &str = "\
You are a helpful assistant for a newsletter editor. You answer questions about the \
newsletter and rewrite parts of it on request.";

/// Replace `{context}` and `{prompt}` before sending.
pub const CHAT_PROMPT_TEMPLATE: &str = r#"Help the user improve their newsletter.

If the user asks for a change to a specific part of the newsletter (for example "make the introduction more exciting" or "rewrite the second paragraph"), identify the matching blockId from the context and put the rewritten content in "replacement". Keep "response" to a brief confirmation such as "Sure, here's a rewrite:".

If the user asks to rearrange the layout, return "layoutSuggestion": a list of {"blockId", "colspan"} where colspan is 1 (half width) or 2 (full width). Only use blockIds from the context.

For a general question, answer in "response" and omit "replacement" and "layoutSuggestion".

The newsletter currently contains the blocks below. Each block has a unique blockId.
---
{context}
---

User: {prompt}

Return JSON only:
{"response": "...", "replacement": {"blockId": "...", "newContent": "..."}, "layoutSuggestion": [{"blockId": "...", "colspan": 2}]}"#;
