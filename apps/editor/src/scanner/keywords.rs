//! Default sensitive-keyword list and an offline keyword classifier.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};

use crate::errors::AppError;
use crate::scanner::classifier::{
    parse_serialized, ConfidentialityClassifier, FlaggedItem, ScanRequest, ScanResponse,
};

pub const DEFAULT_SENSITIVE_KEYWORDS: &[&str] = &[
    "confidential",
    "proprietary",
    "Project Alpha",
    "Project Phoenix",
    "financial data",
    "secret",
    "Internal",
    "External under NDA",
    "External NDA",
    "Non disclosure agreement",
];

pub fn default_sensitive_keywords() -> Vec<String> {
    DEFAULT_SENSITIVE_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Case-insensitive whole-word matcher that runs without the model.
///
/// Reports one item per sentence containing a keyword.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn matcher(keyword: &str) -> Result<Regex, AppError> {
        RegexBuilder::new(&format!(r"\b{}\b", regex::escape(keyword.trim())))
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::Validation(format!("Bad keyword '{keyword}': {e}")))
    }
}

#[async_trait]
impl ConfidentialityClassifier for KeywordClassifier {
    async fn classify(&self, request: &ScanRequest) -> Result<ScanResponse, AppError> {
        let matchers = request
            .sensitive_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| Ok((k, Self::matcher(k)?)))
            .collect::<Result<Vec<_>, AppError>>()?;

        let mut flagged_items = Vec::new();
        for (block_id, body) in parse_serialized(&request.newsletter_content) {
            for sentence in sentences(body) {
                for (keyword, re) in &matchers {
                    if re.is_match(sentence) {
                        flagged_items.push(FlaggedItem {
                            keyword: keyword.to_string(),
                            sentence: sentence.to_string(),
                            block_id: block_id.to_string(),
                        });
                    }
                }
            }
        }

        Ok(ScanResponse {
            is_confidential: !flagged_items.is_empty(),
            flagged_items,
        })
    }
}

/// Splits text into trimmed sentences on `.`, `!`, `?` and line breaks.
fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
