use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailPeekResult;
use crate::modules::graph::model::{Message, MessageListResponse};
use crate::modules::message::{millis_from_rfc3339, Email};
use crate::raise_error;
use tracing::error;

/// Maps a logical folder selector onto a Graph well-known folder id.
///
/// Anything other than the inbox or the junk folder is coerced to the inbox.
pub fn graph_folder_id(mailbox: &str) -> &'static str {
    if mailbox.eq_ignore_ascii_case("inbox") {
        "inbox"
    } else if mailbox == "Junk" {
        "junkemail"
    } else {
        "inbox"
    }
}

/// Lists the newest `limit` messages of a Graph mail folder.
///
/// Any failure degrades to an empty list: the caller already committed to the
/// Graph path after a successful scope probe, so a listing error is logged and
/// treated as "no messages" rather than aborting the retrieval.
pub async fn fetch_latest_messages(
    access_token: &str,
    folder_id: &str,
    limit: usize,
) -> Vec<Email> {
    match list_messages(access_token, folder_id, limit).await {
        Ok(emails) => emails,
        Err(e) => {
            error!("Graph API listing failed, returning an empty result: {e}");
            Vec::new()
        }
    }
}

async fn list_messages(
    access_token: &str,
    folder_id: &str,
    limit: usize,
) -> MailPeekResult<Vec<Email>> {
    let url = format!("https://graph.microsoft.com/v1.0/me/mailFolders/{folder_id}/messages");
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

    let response = client
        .get(&url)
        .bearer_auth(access_token)
        .query(&[
            ("$top", limit.to_string().as_str()),
            ("$orderby", "receivedDateTime desc"),
            (
                "$select",
                "id,from,subject,receivedDateTime,createdDateTime,bodyPreview,body",
            ),
        ])
        .send()
        .await
        .map_err(|e| {
            raise_error!(
                format!("Graph API request error: {e:#?}"),
                ErrorCode::NetworkError
            )
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(raise_error!(
            format!(
                "Graph API returned status {}, response: {}",
                status.as_u16(),
                body
            ),
            ErrorCode::GraphApiCallFailed
        ));
    }

    let list = response
        .json::<MessageListResponse>()
        .await
        .map_err(|e| {
            raise_error!(
                format!(
                    "Failed to deserialize Graph API response into MessageListResponse: {:#?}. Possible model mismatch or API change.",
                    e
                ),
                ErrorCode::GraphApiCallFailed
            )
        })?;

    Ok(list.value.into_iter().map(map_message).collect())
}

fn map_message(message: Message) -> Email {
    let send = message
        .from
        .and_then(|from| from.email_address.address)
        .unwrap_or_default();
    let date = message.received_date_time.or(message.created_date_time);
    let received_at_ms = date.as_deref().and_then(millis_from_rfc3339);
    Email {
        send,
        subject: message.subject,
        text: message.body_preview,
        html: message.body.map(|body| body.content),
        date,
        received_at_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::{graph_folder_id, map_message};
    use crate::modules::graph::model::Message;

    #[test]
    fn test_folder_mapping() {
        assert_eq!(graph_folder_id("INBOX"), "inbox");
        assert_eq!(graph_folder_id("inbox"), "inbox");
        assert_eq!(graph_folder_id("Inbox"), "inbox");
        assert_eq!(graph_folder_id("Junk"), "junkemail");
        assert_eq!(graph_folder_id("Archive"), "inbox");
        assert_eq!(graph_folder_id(""), "inbox");
    }

    #[test]
    fn test_map_message() {
        let message: Message = serde_json::from_str(
            r#"{
                "id": "AAMk",
                "subject": "Weekly report",
                "receivedDateTime": "2025-06-01T10:30:00Z",
                "bodyPreview": "Numbers attached",
                "body": {"contentType": "html", "content": "<p>Numbers attached</p>"},
                "from": {"emailAddress": {"name": "Reporting", "address": "reports@example.com"}}
            }"#,
        )
        .unwrap();

        let email = map_message(message);
        assert_eq!(email.send, "reports@example.com");
        assert_eq!(email.subject.as_deref(), Some("Weekly report"));
        assert_eq!(email.text.as_deref(), Some("Numbers attached"));
        assert_eq!(email.html.as_deref(), Some("<p>Numbers attached</p>"));
        assert_eq!(email.date.as_deref(), Some("2025-06-01T10:30:00Z"));
        assert!(email.received_at_ms.is_some());
    }

    #[test]
    fn test_map_message_fallbacks() {
        let message: Message = serde_json::from_str(
            r#"{"id": "AAMl", "createdDateTime": "2025-06-02T08:00:00Z"}"#,
        )
        .unwrap();

        let email = map_message(message);
        assert_eq!(email.send, "");
        assert!(email.subject.is_none());
        assert!(email.text.is_none());
        assert!(email.html.is_none());
        assert_eq!(email.date.as_deref(), Some("2025-06-02T08:00:00Z"));
    }
}
