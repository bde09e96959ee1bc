// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use super::error::code::ErrorCode;
use super::error::MailPeekError;
use poem::error::ResponseError;
use poem::Body;
use poem::{http::StatusCode, Error, Response};
use tracing::error;

pub mod auth;
pub mod error;
pub mod log;
pub mod rustls;
pub mod timeout;

#[inline]
fn create_mailpeek_error(message: &str, code: ErrorCode) -> MailPeekError {
    MailPeekError::Generic {
        message: message.into(),
        location: snafu::Location::default(),
        code,
    }
}

#[inline]
pub fn create_api_error_response(message: &str, code: ErrorCode) -> Error {
    let mailpeek_error = create_mailpeek_error(message, code);
    mailpeek_error.into()
}

impl ResponseError for MailPeekError {
    fn status(&self) -> StatusCode {
        match self {
            MailPeekError::Generic {
                message: _,
                location: _,
                code,
            } => code.status(),
        }
    }

    fn as_response(&self) -> Response
    where
        Self: std::error::Error + Send + Sync + 'static,
    {
        match self {
            MailPeekError::Generic {
                message,
                location,
                code,
            } => {
                error!(
                    error_code = *code as u32,
                    error_message = %message,
                    error_location = ?location
                );

                let (wire_message, details) = self.wire_parts();
                let mut body = serde_json::json!({
                    "code": *code as u32,
                    "error": wire_message,
                });
                if let Some(details) = details {
                    body["details"] = serde_json::Value::String(details);
                }

                Response::builder()
                    .status(self.status())
                    .body(Body::from_json(body).unwrap())
            }
        }
    }
}
