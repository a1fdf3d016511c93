//! Error type for the HTTP API and its mapping to status codes

use serde_json::{json, Value};

use crate::storage::StorageError;

/// Everything a handler can fail with
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad or missing input (400)
    #[error("{0}")]
    Validation(String),

    /// Referenced file or route does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Request body over the configured limit (413)
    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Anything else (500); the cause is logged, never sent to the client
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::Internal(_) => 500,
        }
    }

    /// JSON body sent to the client
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation(msg) => json!({ "error": "validation_error", "detail": msg }),
            ApiError::NotFound(msg) => json!({ "error": "not_found", "detail": msg }),
            ApiError::PayloadTooLarge(limit) => {
                json!({ "error": "payload_too_large", "detail": format!("limit is {} bytes", limit) })
            }
            ApiError::Internal(_) => {
                json!({ "error": "internal_error", "detail": "internal server error" })
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidId(id) => {
                ApiError::Validation(format!("invalid file_id '{}'", id))
            }
            StorageError::NotFound(id) => ApiError::NotFound(format!("file '{}' not found", id)),
            StorageError::UnsupportedExtension(name) => ApiError::Validation(format!(
                "unsupported file type '{}'; allowed: {}",
                name,
                crate::Language::allowed_extensions()
            )),
            StorageError::InvalidFilename(name) => {
                ApiError::Validation(format!("invalid filename '{}'", name))
            }
            other => ApiError::Internal(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::validation("x").status_code(), 400);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::PayloadTooLarge(10).status_code(), 413);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("disk on fire")).status_code(),
            500
        );
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let body = ApiError::Internal(anyhow::anyhow!("secret path /var/x")).to_json();
        assert_eq!(body["error"], "internal_error");
        assert!(!body.to_string().contains("secret"));
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: ApiError = StorageError::NotFound("abc".into()).into();
        assert_eq!(err.status_code(), 404);

        let err: ApiError = StorageError::UnsupportedExtension("a.exe".into()).into();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains(".py"));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: ApiError = StorageError::Io(io).into();
        assert_eq!(err.status_code(), 500);
    }
}
