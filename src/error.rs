use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable failure code returned to callers. Serialized as snake_case so
/// callers can branch on the string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    CollectionFailed,
    LowHqcScore,
    LocationRequired,
    GenerationError,
    Exception,
    DuplicateFound,
    UnsupportedModel,
    ApiError,
    /// A generation was requested while another one is in flight on the same
    /// orchestrator; nothing was done.
    AlreadyRunning,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::CollectionFailed => "collection_failed",
            ErrorCode::LowHqcScore => "low_hqc_score",
            ErrorCode::LocationRequired => "location_required",
            ErrorCode::GenerationError => "generation_error",
            ErrorCode::Exception => "exception",
            ErrorCode::DuplicateFound => "duplicate_found",
            ErrorCode::UnsupportedModel => "unsupported_model",
            ErrorCode::ApiError => "api_error",
            ErrorCode::AlreadyRunning => "already_running",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider returned an empty response")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("post {0} not found")]
    PostNotFound(u64),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Internal pipeline error. Converted to a [`crate::GenerationOutcome`]
/// failure at the orchestrator boundary and never returned to callers as-is.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("no data collected for '{0}'")]
    CollectionFailed(String),

    #[error("source data score {score:.2} is below threshold {threshold:.2}")]
    LowHqcScore { score: f64, threshold: f64 },

    #[error("a location is required")]
    LocationRequired,

    #[error("an article for '{hotel}' already exists (post {post_id})")]
    DuplicateFound { hotel: String, post_id: u64 },

    #[error("generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("a generation is already in progress")]
    AlreadyRunning,
}

impl GenerationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GenerationError::CollectionFailed(_) => ErrorCode::CollectionFailed,
            GenerationError::LowHqcScore { .. } => ErrorCode::LowHqcScore,
            GenerationError::LocationRequired => ErrorCode::LocationRequired,
            GenerationError::DuplicateFound { .. } => ErrorCode::DuplicateFound,
            GenerationError::Generation(_) => ErrorCode::GenerationError,
            GenerationError::Provider(ProviderError::UnsupportedModel(_)) => {
                ErrorCode::UnsupportedModel
            }
            GenerationError::Provider(ProviderError::EmptyResponse) => ErrorCode::GenerationError,
            GenerationError::Provider(_) => ErrorCode::ApiError,
            GenerationError::Store(_) => ErrorCode::Exception,
            GenerationError::AlreadyRunning => ErrorCode::AlreadyRunning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_stable_strings() {
        for code in [
            ErrorCode::CollectionFailed,
            ErrorCode::LowHqcScore,
            ErrorCode::LocationRequired,
            ErrorCode::GenerationError,
            ErrorCode::Exception,
            ErrorCode::DuplicateFound,
            ErrorCode::UnsupportedModel,
            ErrorCode::ApiError,
            ErrorCode::AlreadyRunning,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn provider_errors_map_to_codes() {
        let unsupported: GenerationError = ProviderError::UnsupportedModel("llama".into()).into();
        assert_eq!(unsupported.code(), ErrorCode::UnsupportedModel);
        let api: GenerationError = ProviderError::Api("503".into()).into();
        assert_eq!(api.code(), ErrorCode::ApiError);
        let timeout: GenerationError = ProviderError::Timeout(Duration::from_secs(120)).into();
        assert_eq!(timeout.code(), ErrorCode::ApiError);
        let store: GenerationError = StoreError::Storage("disk".into()).into();
        assert_eq!(store.code(), ErrorCode::Exception);
    }
}
