use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::rag::RagError;

/// JSON error envelope returned by every failing endpoint. Internal
/// diagnostics stay in the logs; the client sees the message and a stable
/// error code.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub error_code: &'static str,
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        let (status, error_code) = match &err {
            RagError::InvalidQuery => (StatusCode::BAD_REQUEST, "QUERY_EMPTY_PROMPT"),
            RagError::IndexUnavailable(_) => (StatusCode::BAD_GATEWAY, "INDEX_UNAVAILABLE"),
            RagError::Retrieval(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RETRIEVAL_FAILED"),
            RagError::IndexConsistency { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INDEX_INCONSISTENT")
            }
            RagError::Generation(_) => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED"),
        };
        Self {
            status,
            error: err.to_string(),
            error_code,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_maps_to_bad_request() {
        let api_err = ApiError::from(RagError::InvalidQuery);
        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.error_code, "QUERY_EMPTY_PROMPT");
    }

    #[test]
    fn consistency_violation_maps_to_internal_error() {
        let api_err = ApiError::from(RagError::IndexConsistency {
            key: 9,
            corpus_len: 3,
        });
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.error_code, "INDEX_INCONSISTENT");
    }
}
