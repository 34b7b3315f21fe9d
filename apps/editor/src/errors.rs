use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
///
/// Every fallible operation in the editing core returns `Result<T, AppError>`.
/// Hosts surface failures as transient notifications via [`AppError::user_message`];
/// the underlying detail is logged, never shown.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid table mutation: {0}")]
    InvalidTableMutation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl AppError {
    /// Stable machine-readable code for the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidTableMutation(_) => "INVALID_TABLE_MUTATION",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Text for the operator-facing notification. Internal failures are logged here.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidTableMutation(msg) => msg.clone(),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                "An AI processing error occurred. Please try again.".to_string()
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                "Could not read or write the newsletter.".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {e}");
                "The newsletter data is unreadable.".to_string()
            }
            AppError::ServiceUnavailable(msg) => {
                tracing::error!("Service unavailable: {msg}");
                "The AI service did not return a usable result. Please try again.".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(
            AppError::InvalidTableMutation("x".into()).code(),
            "INVALID_TABLE_MUTATION"
        );
        assert_eq!(AppError::Llm("x".into()).code(), "LLM_ERROR");
    }

    #[test]
    fn test_llm_error_converts() {
        let err: AppError = LlmError::EmptyContent.into();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_internal_details_are_not_shown() {
        let err = AppError::Internal(anyhow::anyhow!("secret stack detail"));
        assert!(!err.user_message().contains("secret"));
    }
}
