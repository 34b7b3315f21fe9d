// LLM prompt constants for source extraction.

pub const EXTRACT_URL_SYSTEM: &str = "\
You are an expert content extractor. You read web pages and keep only the main article.";

/// Replace `{url}` and `{page}` before sending.
pub const EXTRACT_URL_PROMPT_TEMPLATE: &str = r#"Extract the main article title and text from the web page below.

Instructions:
1. Ignore advertisements, navigation, sidebars, footers and comments.
2. Extract the primary title of the article or page.
3. Extract the full text of the main article. Preserve paragraph breaks.

URL: {url}

PAGE TEXT:
"""
{page}
"""

Return JSON only: {"title": "optional title", "content": "article text"}"#;

pub const EXTRACT_IMAGE_SYSTEM: &str = "You perform OCR on images of documents.";

pub const EXTRACT_IMAGE_PROMPT: &str = r#"Perform OCR on the attached image and extract all text.

Return JSON only: {"extractedText": "..."}"#;
