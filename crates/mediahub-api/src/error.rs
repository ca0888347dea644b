//! HTTP rendering of [`AppError`].
//!
//! Handlers return `Result<_, HttpAppError>` and build failures from `AppError` or
//! from the domain errors converted below, so every failure renders the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediahub_core::{is_production_name, AppError, ErrorMetadata, LogLevel};
use mediahub_processing::{EncodeError, TranscodeError};
use mediahub_storage::StorageError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Client-facing message
    pub error: String,
    /// Same text as `error`; older clients read this key
    pub message: String,
    /// Cause chain, omitted in production and for sensitive errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Stable code such as `NOT_FOUND`
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        let message = error.client_message();
        Self {
            error: message.clone(),
            message,
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// `AppError` lives in mediahub-core, so `IntoResponse` is implemented on this local wrapper.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let kind = error.error_type();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, kind, "Request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, kind, "Request failed"),
        LogLevel::Error => tracing::error!(error = %error, kind, "Request failed"),
    }
}

/// Read per response; the error path has no access to `Config`.
fn hides_details() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .is_ok_and(|env| is_production_name(&env))
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let HttpAppError(error) = self;
        log_error(&error);

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let with_details = !hides_details() && !error.is_sensitive();

        (status, Json(ErrorResponse::from_app_error(&error, with_details))).into_response()
    }
}

// Convert domain errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::WriteFailed(msg)
            | StorageError::ReadFailed(msg)
            | StorageError::CopyFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::RootUnavailable(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<EncodeError> for HttpAppError {
    fn from(err: EncodeError) -> Self {
        let app = match err {
            EncodeError::InvalidQuality => AppError::InvalidInput(err.to_string()),
            EncodeError::Decode(_) | EncodeError::Encode(_) | EncodeError::Task(_) => {
                AppError::ProcessingFailed {
                    message: "Failed to process image".to_string(),
                    details: err.to_string(),
                }
            }
        };
        HttpAppError(app)
    }
}

impl From<TranscodeError> for HttpAppError {
    fn from(err: TranscodeError) -> Self {
        let message = match err {
            TranscodeError::WriteOriginal(_) => "Failed to process video",
            TranscodeError::FallbackCopyFailed { .. } => "Failed to compress video",
            TranscodeError::AlreadyResponded | TranscodeError::Task(_) => {
                return HttpAppError(AppError::Internal(err.to_string()))
            }
        };
        HttpAppError(AppError::ProcessingFailed {
            message: message.to_string(),
            details: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahub_processing::DegradeReason;

    #[test]
    fn test_from_storage_error_not_found() {
        let storage_err = StorageError::NotFound("File not found".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::NotFound(msg) => assert_eq!(msg, "File not found"),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let storage_err = StorageError::InvalidKey("Invalid key".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "Invalid key"),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_from_storage_error_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let HttpAppError(app_err) = StorageError::IoError(io_err).into();
        match app_err {
            AppError::Internal(msg) => assert!(msg.contains("IO error")),
            _ => panic!("Expected Internal variant"),
        }
    }

    #[test]
    fn test_from_encode_error() {
        let HttpAppError(app_err) = EncodeError::InvalidQuality.into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "Quality must be between 1 and 100"),
            _ => panic!("Expected InvalidInput variant"),
        }

        let HttpAppError(app_err) = EncodeError::Task("join error".to_string()).into();
        assert_eq!(app_err.client_message(), "Failed to process image");
        assert_eq!(app_err.http_status_code(), 500);
    }

    #[test]
    fn test_from_transcode_error() {
        let err = TranscodeError::FallbackCopyFailed {
            reason: DegradeReason::Unavailable,
            source: StorageError::CopyFailed("disk full".to_string()),
        };
        let HttpAppError(app_err) = err.into();
        assert_eq!(app_err.client_message(), "Failed to compress video");
        assert!(app_err.detailed_message().contains("disk full"));

        let err = TranscodeError::WriteOriginal(StorageError::WriteFailed("read-only".to_string()));
        let HttpAppError(app_err) = err.into();
        assert_eq!(app_err.client_message(), "Failed to process video");
    }

    /// Both `error` and `message` carry the client message; `details` only when allowed.
    #[test]
    fn test_error_response_shape() {
        let err = AppError::NotFound("Image not found".to_string());

        let json = serde_json::to_value(ErrorResponse::from_app_error(&err, true)).unwrap();
        assert_eq!(json["error"], "Image not found");
        assert_eq!(json["message"], "Image not found");
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_some());

        let json = serde_json::to_value(ErrorResponse::from_app_error(&err, false)).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }
}
