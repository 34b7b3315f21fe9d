//! Content extraction for link, image and file sources.

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::{ImageInput, LlmClient};
use crate::models::{Source, SourceKind};
use crate::sources::prompts::{
    EXTRACT_IMAGE_PROMPT, EXTRACT_IMAGE_SYSTEM, EXTRACT_URL_PROMPT_TEMPLATE, EXTRACT_URL_SYSTEM,
};

/// Page text beyond this many characters is not sent to the model.
const MAX_PAGE_CHARS: usize = 60_000;
/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

static DATA_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([^;,]+);base64,([A-Za-z0-9+/=\s]+)$").expect("valid regex")
});
static SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n\s*|[ \t]{2,}").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageText {
    #[serde(default)]
    extracted_text: String,
}

/// A parsed `data:<mime>;base64,<payload>` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub media_type: &'a str,
    pub base64_data: &'a str,
}

impl<'a> DataUri<'a> {
    pub fn parse(uri: &'a str) -> Result<Self, AppError> {
        let caps = DATA_URI_RE
            .captures(uri.trim())
            .ok_or_else(|| AppError::Validation("Invalid data URI format.".to_string()))?;
        match (caps.get(1), caps.get(2)) {
            (Some(media_type), Some(data)) => Ok(Self {
                media_type: media_type.as_str(),
                base64_data: data.as_str(),
            }),
            _ => Err(AppError::Validation("Invalid data URI format.".to_string())),
        }
    }
}

/// Link and image extraction services.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract_url(&self, url: &str) -> Result<ExtractedContent, AppError>;
    async fn extract_image_text(&self, data_uri: &str) -> Result<String, AppError>;
}

#[async_trait]
impl ContentExtractor for LlmClient {
    async fn extract_url(&self, url: &str) -> Result<ExtractedContent, AppError> {
        let url = parse_web_url(url)?;
        let response = self
            .http()
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::ServiceUnavailable(format!("Could not fetch {url}: {e}")))?;
        let html = response
            .text()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("Could not read {url}: {e}")))?;

        let page = page_text(&html);
        debug!("Fetched {url}: {} chars of page text", page.len());

        let prompt = fill_template(
            EXTRACT_URL_PROMPT_TEMPLATE,
            &[("{url}", url.as_str()), ("{page}", page.as_str())],
        );
        self.call_json(&prompt, &json_system(EXTRACT_URL_SYSTEM))
            .await
            .map_err(|e| AppError::Llm(format!("URL extraction failed: {e}")))
    }

    async fn extract_image_text(&self, data_uri: &str) -> Result<String, AppError> {
        let uri = DataUri::parse(data_uri)?;
        if !uri.media_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Expected an image, got {}",
                uri.media_type
            )));
        }

        let image = ImageInput {
            media_type: uri.media_type,
            base64_data: uri.base64_data,
        };
        let parsed: ImageText = self
            .call_json_with_image(EXTRACT_IMAGE_PROMPT, &json_system(EXTRACT_IMAGE_SYSTEM), image)
            .await
            .map_err(|e| AppError::Llm(format!("Image text extraction failed: {e}")))?;
        Ok(parsed.extracted_text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Local helpers
// ────────────────────────────────────────────────────────────────────────────

/// Accepts absolute http(s) URLs only.
pub fn parse_web_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Validation(format!("Invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Validation(format!(
            "Unsupported URL scheme '{other}'"
        ))),
    }
}

/// Visible text of an HTML page, one text node per line, whitespace collapsed
/// and length capped. Entities are decoded by the parser.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            matches!(a.value(), Node::Element(e) if HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            raw.push_str(text);
            raw.push('\n');
        }
    }

    let text = SPACE_RE.replace_all(&raw, |caps: &regex::Captures| {
        if caps[0].contains('\n') {
            "\n".to_string()
        } else {
            " ".to_string()
        }
    });
    text.trim().chars().take(MAX_PAGE_CHARS).collect()
}

/// Reads an uploaded file. Plain text and markdown are read as UTF-8, PDFs via `pdf-extract`.
pub fn extract_file(name: &str, bytes: &[u8]) -> Result<String, AppError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" => String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Validation(format!("{name} is not valid UTF-8 text"))),
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Validation(format!("Could not read PDF {name}: {e}"))),
        _ => Err(AppError::Validation(format!(
            "Unsupported file type for {name}; expected .pdf, .txt or .md"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Source construction
// ────────────────────────────────────────────────────────────────────────────

pub fn text_source(name: &str, text: &str) -> Source {
    Source {
        name: name.to_string(),
        kind: SourceKind::Text,
        content: text.to_string(),
    }
}

pub fn file_source(name: &str, bytes: &[u8]) -> Result<Source, AppError> {
    let content = extract_file(name, bytes)?;
    info!("Read {} chars from file {name}", content.len());
    Ok(Source {
        name: name.to_string(),
        kind: SourceKind::File,
        content,
    })
}

/// Named after the page title when the extractor finds one.
pub async fn link_source(
    extractor: &dyn ContentExtractor,
    url: &str,
) -> Result<Source, AppError> {
    let extracted = extractor.extract_url(url).await?;
    let name = extracted
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| url.trim().to_string());
    Ok(Source {
        name,
        kind: SourceKind::Link,
        content: extracted.content,
    })
}

pub async fn image_source(
    extractor: &dyn ContentExtractor,
    name: &str,
    data_uri: &str,
) -> Result<Source, AppError> {
    let content = extractor.extract_image_text(data_uri).await?;
    Ok(Source {
        name: name.to_string(),
        kind: SourceKind::Image,
        content,
    })
}
