//! LLM prompt constants for the confidentiality scan.
//!
//! The model returns `{"flaggedItems": [...], "isConfidential": bool}` JSON only.

pub const SCAN_SYSTEM: &str = "\
You are a content safety checker for an internal company newsletter. You find sentences \
that contain sensitive keywords so an editor can review them before publishing.";

pub const SCAN_PROMPT_TEMPLATE: &str = "\
Review the newsletter content below and identify every sentence that contains one of the \
sensitive keywords.\n\
\n\
SENSITIVE KEYWORDS: {keywords}\n\
\n\
The content is split into blocks. Each block starts with a line `id: <blockId>`. \
Use these exact ids in your response.\n\
\n\
For each keyword occurrence, return an object with:\n\
1. keyword: the sensitive keyword exactly as listed\n\
2. sentence: the full sentence in which it appears\n\
3. blockId: the id of the block containing that sentence\n\
\n\
Also decide whether the newsletter as a whole should be considered confidential.\n\
\n\
NEWSLETTER CONTENT:\n\
\"\"\"\n\
{content}\n\
\"\"\"\n\
\n\
Return JSON only: {\"flaggedItems\": [{\"keyword\": \"...\", \"sentence\": \"...\", \"blockId\": \"...\"}], \"isConfidential\": false}";

/// Renders the keyword list as `"a", "b", "c"`.
pub fn quote_keywords(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| format!("\"{k}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
