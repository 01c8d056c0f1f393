//! HTTP error responses.
//!
//! Handlers return `Result<_, HttpError>`. Core errors convert with `?` and
//! render as a status code plus a JSON [`ErrorResponse`] body.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sealcrop_core::{DecodeError, EncodeError, ExportError, SessionError};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code
    pub code: &'static str,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        let (status, code) = match err {
            SessionError::Export(inner) => return inner.into(),
            SessionError::WrongStage { .. } => (StatusCode::CONFLICT, "wrong_stage"),
            SessionError::SelectionCount { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "selection_count")
            }
            SessionError::UnknownImage(_) => (StatusCode::NOT_FOUND, "unknown_image"),
            SessionError::MissingFilename => (StatusCode::BAD_REQUEST, "missing_filename"),
            SessionError::Decode { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "decode_failed"),
            SessionError::Enhance(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_parameter"),
            SessionError::Crop(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_crop"),
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<ExportError> for HttpError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NotFound { .. } | ExportError::InvalidName(_) => {
                Self::not_found(err.to_string())
            }
            _ => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "export_failed",
                err.to_string(),
            ),
        }
    }
}

impl From<EncodeError> for HttpError {
    fn from(err: EncodeError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "encode_failed",
            err.to_string(),
        )
    }
}

impl From<DecodeError> for HttpError {
    fn from(err: DecodeError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "decode_failed",
            err.to_string(),
        )
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_multipart",
            format!("Failed to read upload: {}", err.body_text()),
        )
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            format!("Invalid request body: {}", rejection.body_text()),
        )
    }
}

/// JSON body extractor that rejects with an [`ErrorResponse`] instead of
/// axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state).await?;
        Ok(ValidatedJson(inner))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, code = self.code, error = %self.message, "Request failed");
        } else {
            tracing::warn!(status = %self.status, code = self.code, error = %self.message, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message,
            code: self.code,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealcrop_core::session::Stage;
    use std::path::PathBuf;

    #[test]
    fn test_session_error_statuses() {
        let cases = [
            (
                SessionError::WrongStage {
                    action: "export",
                    stage: Stage::Selecting,
                },
                StatusCode::CONFLICT,
            ),
            (
                SessionError::SelectionCount { count: 0 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                SessionError::UnknownImage("a.png".into()),
                StatusCode::NOT_FOUND,
            ),
            (SessionError::MissingFilename, StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(HttpError::from(err).status(), status);
        }
    }

    #[test]
    fn test_export_errors_keep_path() {
        let err = SessionError::Export(ExportError::CreateDir {
            path: PathBuf::from("/nope/out"),
            source: std::io::Error::other("denied"),
        });
        let http = HttpError::from(err);

        assert_eq!(http.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(http.code(), "export_failed");
        assert!(http.message.contains("/nope/out"));
    }

    #[test]
    fn test_bad_artifact_name_is_not_found() {
        let http = HttpError::from(ExportError::InvalidName("../secret".into()));
        assert_eq!(http.status(), StatusCode::NOT_FOUND);
    }
}
