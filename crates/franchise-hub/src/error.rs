use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::validation::ValidationError;
use crate::workflows::enquiries::EnquiryServiceError;
use crate::workflows::franchises::{DirectoryError, FranchiseServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    BadRequest(ValidationError),
    Intake(EnquiryServiceError),
    Directory(FranchiseServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::BadRequest(err) => write!(f, "bad request: {}", err),
            AppError::Intake(err) => write!(f, "enquiry intake error: {}", err),
            AppError::Directory(err) => write!(f, "franchise directory error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::BadRequest(err) => Some(err),
            AppError::Intake(err) => Some(err),
            AppError::Directory(err) => Some(err),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_)
            | AppError::Intake(EnquiryServiceError::Validation(_))
            | AppError::Directory(FranchiseServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Intake(EnquiryServiceError::NotFound(_))
            | AppError::Directory(FranchiseServiceError::NotFound(_))
            | AppError::Directory(FranchiseServiceError::Directory(DirectoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Directory(FranchiseServiceError::SlugExhausted(_))
            | AppError::Directory(FranchiseServiceError::Directory(DirectoryError::SlugTaken(_))) => {
                StatusCode::CONFLICT
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Intake(_)
            | AppError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn validation(&self) -> Option<&ValidationError> {
        match self {
            AppError::BadRequest(err)
            | AppError::Intake(EnquiryServiceError::Validation(err))
            | AppError::Directory(FranchiseServiceError::Validation(err)) => Some(err),
            _ => None,
        }
    }

    /// Caller-facing message; request errors drop the process-level prefix.
    fn message(&self) -> String {
        match self {
            AppError::BadRequest(err) => err.to_string(),
            AppError::Intake(err) => err.to_string(),
            AppError::Directory(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.message() });
        if let Some(validation) = self.validation() {
            body["fields"] = json!(validation.by_field());
        }
        (self.status(), Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::BadRequest(value)
    }
}

impl From<EnquiryServiceError> for AppError {
    fn from(value: EnquiryServiceError) -> Self {
        Self::Intake(value)
    }
}

impl From<FranchiseServiceError> for AppError {
    fn from(value: FranchiseServiceError) -> Self {
        Self::Directory(value)
    }
}
