use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailPeekResult;
use crate::modules::imap::client::Client;
use crate::modules::imap::oauth2::XOAuth2;
use crate::modules::imap::session::SessionStream;
use crate::modules::message::{rfc3339_from_millis, sort_latest_first, Email};
use crate::{encode_mailbox_name, raise_error};
use async_imap::Session as ImapSession;
use futures::StreamExt;
use mail_parser::{Address, Message, MessageParser};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const FETCH_QUERY: &str = "(INTERNALDATE BODY.PEEK[])";

/// Retrieves the newest messages of a mailbox over IMAP, authenticated with
/// SASL XOAUTH2.
///
/// The session runs connect → authenticate → read-only select → search →
/// bulk fetch of the newest sequence numbers, parses message bodies
/// concurrently as they stream in, and logs out on every outcome.
pub(crate) struct ImapMailReader {
    host: String,
    port: u16,
}

impl ImapMailReader {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub async fn retrieve_latest(
        &self,
        identity: &str,
        access_token: &str,
        mailbox: &str,
        limit: usize,
    ) -> MailPeekResult<Vec<Email>> {
        let authenticator = XOAuth2::new(identity, access_token)?;
        let client = Client::connect(&self.host, self.port).await?;
        let mut session = client.authenticate(authenticator).await?;

        let result = fetch_latest(&mut session, mailbox, limit).await;

        if let Err(e) = session.logout().await {
            debug!("IMAP logout failed: {:#?}", e);
        }
        result
    }
}

async fn fetch_latest(
    session: &mut ImapSession<Box<dyn SessionStream>>,
    mailbox: &str,
    limit: usize,
) -> MailPeekResult<Vec<Email>> {
    let encoded_mailbox = encode_mailbox_name!(mailbox);
    session
        .examine(&encoded_mailbox)
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::MailboxSelectFailed))?;

    let sequences = session
        .search("ALL")
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapSearchFailed))?;

    let Some(sequence_set) = latest_sequence_set(sequences, limit) else {
        return Ok(Vec::new());
    };
    debug!("Fetching sequence set {sequence_set} from mailbox {mailbox}");

    let fetch_stream = session
        .fetch(&sequence_set, FETCH_QUERY)
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapFetchFailed))?;
    futures::pin_mut!(fetch_stream);

    // Message bodies parse in their own tasks while the fetch stream drains;
    // each task owns its slot, so completions cannot race on the accumulator.
    let mut parse_tasks: Vec<JoinHandle<Option<Email>>> = Vec::new();
    while let Some(item) = fetch_stream.next().await {
        let fetch = item
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapFetchFailed))?;
        let internal_date_ms = fetch.internal_date().map(|d| d.timestamp_millis());
        let body = fetch.body().map(|b| b.to_vec());
        parse_tasks.push(tokio::spawn(async move {
            parse_message(body, internal_date_ms)
        }));
    }

    // Only finalize once the stream is fully drained; the number of parsed
    // messages may be less than requested.
    let mut emails = Vec::with_capacity(parse_tasks.len());
    for task in parse_tasks {
        match task.await {
            Ok(Some(email)) => emails.push(email),
            Ok(None) => {}
            Err(e) => warn!("message parse task failed, message dropped: {:#?}", e),
        }
    }

    sort_latest_first(&mut emails);
    Ok(emails)
}

/// Builds the IMAP sequence set covering the newest `limit` identifiers of an
/// ascending search result, with consecutive runs collapsed into ranges.
/// Returns `None` when there is nothing to fetch.
fn latest_sequence_set(ids: impl IntoIterator<Item = u32>, limit: usize) -> Option<String> {
    let mut ids: Vec<u32> = ids.into_iter().collect();
    if ids.is_empty() || limit == 0 {
        return None;
    }
    ids.sort_unstable();
    ids.dedup();
    let tail = ids.split_off(ids.len().saturating_sub(limit));

    let mut parts: Vec<String> = Vec::new();
    let mut start = tail[0];
    let mut end = tail[0];
    for &id in &tail[1..] {
        if id == end + 1 {
            end = id;
        } else {
            parts.push(render_run(start, end));
            start = id;
            end = id;
        }
    }
    parts.push(render_run(start, end));
    Some(parts.join(","))
}

fn render_run(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}:{}", start, end)
    }
}

/// Parses one fetched message body into the normalized shape. A missing or
/// unparseable body is logged and yields `None`; it never fails the fetch.
fn parse_message(body: Option<Vec<u8>>, internal_date_ms: Option<i64>) -> Option<Email> {
    let Some(body) = body else {
        warn!("fetched message has no body, message dropped");
        return None;
    };
    let Some(message) = MessageParser::new().parse(&body) else {
        warn!("failed to parse message body, message dropped");
        return None;
    };

    let received_at_ms = message
        .date()
        .map(|d| d.to_timestamp() * 1000)
        .or(internal_date_ms);

    Some(Email {
        send: sender_display(&message),
        subject: message.subject().map(String::from),
        text: message.body_text(0).map(String::from),
        html: message.body_html(0).map(String::from),
        date: received_at_ms.and_then(rfc3339_from_millis),
        received_at_ms,
    })
}

fn sender_display(message: &Message<'_>) -> String {
    let addr = message.from().and_then(|from| match from {
        Address::List(list) => list.first(),
        Address::Group(groups) => groups.first().and_then(|group| group.addresses.first()),
    });
    match addr {
        Some(addr) => match (addr.name.as_deref(), addr.address.as_deref()) {
            (Some(name), Some(address)) => format!("{} <{}>", name, address),
            (None, Some(address)) => address.to_string(),
            (Some(name), None) => name.to_string(),
            (None, None) => String::new(),
        },
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{latest_sequence_set, parse_message};
    use crate::encode_mailbox_name;

    #[test]
    fn test_mailbox_names_pass_through_verbatim() {
        // Caller-controlled folder names go to the wire unmapped; only
        // non-ASCII characters pick up the UTF-7 encoding IMAP requires.
        assert_eq!(encode_mailbox_name!("Junk"), "Junk");
        assert_eq!(encode_mailbox_name!("INBOX"), "INBOX");
        assert_eq!(encode_mailbox_name!("Entwürfe"), "Entw&APw-rfe");
    }

    #[test]
    fn test_latest_sequence_set_takes_the_tail() {
        assert_eq!(latest_sequence_set(1..=50, 10).unwrap(), "41:50");
        assert_eq!(latest_sequence_set(1..=3, 10).unwrap(), "1:3");
        assert_eq!(latest_sequence_set([7], 1).unwrap(), "7");
    }

    #[test]
    fn test_latest_sequence_set_handles_gaps() {
        assert_eq!(latest_sequence_set([5, 1, 9, 3], 2).unwrap(), "5,9");
        assert_eq!(latest_sequence_set([2, 4, 5, 6, 9], 4).unwrap(), "4:6,9");
    }

    #[test]
    fn test_latest_sequence_set_empty() {
        assert!(latest_sequence_set([], 10).is_none());
        assert!(latest_sequence_set([1, 2], 0).is_none());
    }

    #[test]
    fn test_parse_message() {
        let raw = b"From: Alice <alice@example.com>\r\n\
            To: bob@example.com\r\n\
            Subject: Lunch\r\n\
            Date: Mon, 2 Jun 2025 12:00:00 +0000\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            See you at noon.\r\n";

        let email = parse_message(Some(raw.to_vec()), None).unwrap();
        assert_eq!(email.send, "Alice <alice@example.com>");
        assert_eq!(email.subject.as_deref(), Some("Lunch"));
        assert_eq!(email.text.unwrap().trim(), "See you at noon.");
        assert_eq!(email.received_at_ms, Some(1_748_865_600_000));
        assert!(email.date.is_some());
    }

    #[test]
    fn test_parse_message_falls_back_to_internal_date() {
        let raw = b"From: alice@example.com\r\n\
            Subject: No date header\r\n\
            \r\n\
            body\r\n";

        let email = parse_message(Some(raw.to_vec()), Some(42_000)).unwrap();
        assert_eq!(email.received_at_ms, Some(42_000));
    }

    #[test]
    fn test_missing_body_is_dropped_without_failing_the_batch() {
        let valid = |subject: &str| {
            format!(
                "From: a@example.com\r\nSubject: {}\r\nDate: Mon, 2 Jun 2025 12:00:00 +0000\r\n\r\nhi\r\n",
                subject
            )
            .into_bytes()
        };

        let bodies = vec![Some(valid("one")), None, Some(valid("two"))];
        let parsed: Vec<_> = bodies
            .into_iter()
            .filter_map(|body| parse_message(body, None))
            .collect();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].subject.as_deref(), Some("one"));
        assert_eq!(parsed[1].subject.as_deref(), Some("two"));
    }
}
