// Confidentiality scanning: the classifier contract, result de-duplication,
// an offline keyword matcher and the debounced scheduler.

pub mod classifier;
pub mod debounce;
pub mod keywords;
pub mod prompts;

pub use classifier::{
    resolve_issues, run_scan, serialize_blocks, ConfidentialityClassifier, FlaggedIssue,
    FlaggedItem, ScanOutcome, ScanRequest, ScanResponse, BLOCK_SEPARATOR,
};
pub use debounce::{ScanScheduler, DEFAULT_DEBOUNCE};
pub use keywords::{default_sensitive_keywords, KeywordClassifier, DEFAULT_SENSITIVE_KEYWORDS};
