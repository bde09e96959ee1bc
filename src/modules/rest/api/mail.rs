// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::auth::enforce_operator_password;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailPeekResult;
use crate::modules::message::retrieve::{
    coerce_limit, retrieve_latest_emails, MailCredentials, DEFAULT_LIMIT,
};
use crate::modules::message::Email;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::raise_error;
use poem_openapi::param::Query;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};
use serde::{Deserialize, Serialize};

pub struct MailApi;

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct LatestMailRequest {
    /// Operator password; required when the operator secret is configured.
    pub password: Option<String>,
    /// OAuth2 refresh token for the mailbox account.
    pub refresh_token: Option<String>,
    /// OAuth2 application (client) id.
    pub client_id: Option<String>,
    /// Mailbox identity (email address), used by the IMAP fallback path.
    pub email: Option<String>,
    /// Logical folder selector (e.g. "INBOX" or "Junk").
    pub mailbox: Option<String>,
    /// Maximum number of messages to return (default: 10).
    pub limit: Option<u32>,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Mail")]
impl MailApi {
    /// Returns the latest messages of a mailbox.
    ///
    /// Exchanges the supplied refresh token, then lists the folder through the
    /// Graph API when the granted scope allows it, falling back to IMAP
    /// XOAUTH2 otherwise. Results are ordered newest first; an empty mailbox
    /// yields an empty array, not an error.
    #[oai(path = "/mail/latest", method = "get", operation_id = "get_latest_mail")]
    async fn get_latest_mail(
        &self,
        /// Operator password; required when the operator secret is configured.
        password: Query<Option<String>>,
        /// OAuth2 refresh token for the mailbox account.
        refresh_token: Query<Option<String>>,
        /// OAuth2 application (client) id.
        client_id: Query<Option<String>>,
        /// Mailbox identity (email address), used by the IMAP fallback path.
        email: Query<Option<String>>,
        /// Logical folder selector (e.g. "INBOX" or "Junk").
        mailbox: Query<Option<String>>,
        /// Maximum number of messages to return (default: 10).
        limit: Query<Option<String>>,
    ) -> ApiResult<Json<Vec<Email>>> {
        enforce_operator_password(password.0.as_deref())?;
        let (credentials, mailbox) =
            required_credentials(refresh_token.0, client_id.0, email.0, mailbox.0)?;
        let limit = coerce_limit(limit.0.as_deref());
        Ok(Json(
            retrieve_latest_emails(&credentials, &mailbox, limit).await?,
        ))
    }

    /// Returns the latest messages of a mailbox (parameters in the body).
    #[oai(
        path = "/mail/latest",
        method = "post",
        operation_id = "post_latest_mail"
    )]
    async fn post_latest_mail(
        &self,
        /// A JSON payload carrying the same fields as the query variant.
        request: Json<LatestMailRequest>,
    ) -> ApiResult<Json<Vec<Email>>> {
        let request = request.0;
        enforce_operator_password(request.password.as_deref())?;
        let (credentials, mailbox) = required_credentials(
            request.refresh_token,
            request.client_id,
            request.email,
            request.mailbox,
        )?;
        let limit = request
            .limit
            .filter(|limit| *limit > 0)
            .map(|limit| limit as usize)
            .unwrap_or(DEFAULT_LIMIT);
        Ok(Json(
            retrieve_latest_emails(&credentials, &mailbox, limit).await?,
        ))
    }
}

fn required_credentials(
    refresh_token: Option<String>,
    client_id: Option<String>,
    email: Option<String>,
    mailbox: Option<String>,
) -> MailPeekResult<(MailCredentials, String)> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
    match (
        non_empty(refresh_token),
        non_empty(client_id),
        non_empty(email),
        non_empty(mailbox),
    ) {
        (Some(refresh_token), Some(client_id), Some(email), Some(mailbox)) => Ok((
            MailCredentials {
                refresh_token,
                client_id,
                email,
            },
            mailbox,
        )),
        _ => Err(raise_error!(
            "Missing required parameters: refresh_token, client_id, email, or mailbox".into(),
            ErrorCode::InvalidParameter
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::required_credentials;
    use crate::modules::error::code::ErrorCode;
    use crate::modules::error::MailPeekError;
    use poem::http::StatusCode;

    fn field(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_all_parameters_present() {
        let (credentials, mailbox) = required_credentials(
            field("RT"),
            field("CID"),
            field("user@example.com"),
            field("INBOX"),
        )
        .unwrap();
        assert_eq!(credentials.refresh_token, "RT");
        assert_eq!(credentials.client_id, "CID");
        assert_eq!(credentials.email, "user@example.com");
        assert_eq!(mailbox, "INBOX");
    }

    #[test]
    fn test_missing_parameter_is_a_bad_request() {
        let cases = [
            required_credentials(None, field("CID"), field("e"), field("INBOX")),
            required_credentials(field("RT"), None, field("e"), field("INBOX")),
            required_credentials(field("RT"), field("CID"), None, field("INBOX")),
            required_credentials(field("RT"), field("CID"), field("e"), None),
            // An empty value counts as missing
            required_credentials(field(""), field("CID"), field("e"), field("INBOX")),
        ];
        for result in cases {
            let MailPeekError::Generic { message, code, .. } = result.unwrap_err();
            assert_eq!(code, ErrorCode::InvalidParameter);
            assert_eq!(code.status(), StatusCode::BAD_REQUEST);
            assert!(message.contains("Missing required parameters"));
        }
    }
}
