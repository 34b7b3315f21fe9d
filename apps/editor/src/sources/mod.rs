// Source ingestion: text, files, links and images become `Source` records.

pub mod extract;
pub mod prompts;

pub use extract::{
    extract_file, file_source, image_source, link_source, page_text, parse_web_url, text_source,
    ContentExtractor, DataUri, ExtractedContent,
};
