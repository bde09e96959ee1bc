// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Formatter;

use code::ErrorCode;
use poem::http::StatusCode;
use poem_openapi::{payload::Json, ApiResponse, Object};
use snafu::{Location, Snafu};

pub mod code;
pub mod handler;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MailPeekError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
}

pub type MailPeekResult<T, E = MailPeekError> = std::result::Result<T, E>;

impl MailPeekError {
    /// The `error`/`details` pair written to the wire. IMAP fetch failures keep
    /// the fixed "Fetch error" label with the underlying message in `details`.
    pub fn wire_parts(&self) -> (String, Option<String>) {
        match self {
            MailPeekError::Generic { message, code, .. } => {
                if *code == ErrorCode::ImapFetchFailed {
                    ("Fetch error".to_string(), Some(message.clone()))
                } else {
                    (message.clone(), None)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Object)]
pub struct ApiError {
    pub error: String,
    pub code: u32,
    pub details: Option<String>,
}

impl From<MailPeekError> for ApiErrorResponse {
    fn from(error: MailPeekError) -> Self {
        let (wire_message, details) = error.wire_parts();
        match error {
            MailPeekError::Generic {
                message,
                location,
                code,
            } => {
                tracing::error!(
                    "API error occurred: [{:#?}] {} at {:?}",
                    code,
                    message,
                    location
                );
                let api_error = ApiError {
                    error: wire_message,
                    code: code as u32,
                    details,
                };
                ApiErrorResponse::Generic(code.status(), Json(api_error))
            }
        }
    }
}

impl ApiError {
    pub fn new(error: String, code: u32) -> Self {
        Self {
            error,
            code,
            details: None,
        }
    }

    pub fn new_with_error_code<ErrorType: std::fmt::Display>(
        error: ErrorType,
        code: u32,
    ) -> ApiError {
        Self::new(format!("{:#}", error), code)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error({}): {}", self.code, self.error)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, ApiResponse)]
pub enum ApiErrorResponse {
    Generic(StatusCode, Json<ApiError>),
}
