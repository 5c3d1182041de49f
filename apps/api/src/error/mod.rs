use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("A soundtrack is already being generated, try again shortly")]
    Busy,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Failure of one orchestration invocation.
///
/// Every stage of the soundtrack pipeline reports through this type, so the
/// caller only ever sees the first failure, carrying the upstream message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0} is not configured")]
    Configuration(String),

    #[error("Failed to generate music prompt: {0}")]
    Upstream(String),

    #[error("Music generation failed: {0}")]
    GenerationFailed(String),

    #[error("Invalid audio URL format from generation service: {0}")]
    MalformedResult(String),

    #[error("Music generation timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    #[error("Music generation was cancelled")]
    Cancelled,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let error = ErrorResponse {
            error: self.to_string(),
        };

        match self {
            ApiError::InvalidInput(_)
            | ApiError::Generation(GenerationError::InvalidRequest(_)) => {
                HttpResponse::BadRequest().json(error)
            }
            ApiError::NotFound(_) => HttpResponse::NotFound().json(error),
            ApiError::Busy => HttpResponse::TooManyRequests().json(error),
            ApiError::Generation(GenerationError::Cancelled) => {
                HttpResponse::ServiceUnavailable().json(error)
            }
            _ => HttpResponse::InternalServerError().json(error),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::ExternalServiceError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::StorageError(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let err = ApiError::from(GenerationError::InvalidRequest(
            "Book title is required".to_string(),
        ));
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Book title is required");
    }

    #[test]
    fn test_stage_failures_map_to_internal_error() {
        let failures = [
            GenerationError::Configuration("GEMINI_API_KEY".to_string()),
            GenerationError::Upstream("quota exceeded".to_string()),
            GenerationError::GenerationFailed("oom".to_string()),
            GenerationError::MalformedResult("42".to_string()),
            GenerationError::Timeout { attempts: 3 },
        ];

        for failure in failures {
            let err = ApiError::from(failure);
            assert_eq!(
                err.error_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_upstream_message_is_preserved() {
        let err = GenerationError::GenerationFailed("oom".to_string());
        assert!(err.to_string().contains("oom"));
    }
}
