use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailPeekResult;
use crate::modules::settings::cli::SETTINGS;
use crate::raise_error;
use serde::Deserialize;

/// Token payload returned by the refresh-token grant. Only the fields this
/// service consumes are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Exchanges a refresh token for an access token against the configured token
/// endpoint. A failed exchange is fatal to the call, there is no retry.
pub async fn exchange_refresh_token(
    refresh_token: &str,
    client_id: &str,
    scope: Option<&str>,
) -> MailPeekResult<TokenGrant> {
    let mut params = vec![
        ("client_id", client_id),
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];
    if let Some(scope) = scope {
        params.push(("scope", scope));
    }

    let client = build_http_client()?;
    let response = client
        .post(&SETTINGS.mailpeek_token_endpoint)
        .form(&params)
        .send()
        .await
        .map_err(|e| {
            raise_error!(
                format!("Failed to reach the OAuth2 token endpoint: {e}"),
                ErrorCode::NetworkError
            )
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        raise_error!(
            format!("Failed to read the OAuth2 token response: {e}"),
            ErrorCode::NetworkError
        )
    })?;

    if !status.is_success() {
        return Err(raise_error!(
            format!(
                "OAuth2 token endpoint returned status {}, response: {}",
                status.as_u16(),
                body
            ),
            ErrorCode::OAuth2ExchangeFailed
        ));
    }

    serde_json::from_str::<TokenGrant>(&body).map_err(|e| {
        raise_error!(
            format!("Failed to parse the OAuth2 token response: {e}, response: {body}"),
            ErrorCode::OAuth2ResponseInvalid
        )
    })
}

fn build_http_client() -> MailPeekResult<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}

#[cfg(test)]
mod tests {
    use super::TokenGrant;

    #[test]
    fn test_token_grant_deserialization() {
        let grant: TokenGrant = serde_json::from_str(
            r#"{"token_type":"Bearer","expires_in":3600,"access_token":"AT","scope":"Mail.Read"}"#,
        )
        .unwrap();
        assert_eq!(grant.access_token, "AT");
        assert_eq!(grant.scope.as_deref(), Some("Mail.Read"));

        let grant: TokenGrant =
            serde_json::from_str(r#"{"access_token":"AT"}"#).unwrap();
        assert!(grant.scope.is_none());
    }
}
