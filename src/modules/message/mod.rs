// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, SecondsFormat};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

pub mod retrieve;

/// The normalized email record produced by either retrieval path.
///
/// Field names are the wire contract; missing sub-fields stay absent rather
/// than failing the whole message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct Email {
    /// The sender display string (empty when no sender is available).
    pub send: String,
    /// The message subject, verbatim.
    pub subject: Option<String>,
    /// The plain-text body (Graph path: the short body preview).
    pub text: Option<String>,
    /// The HTML body content.
    pub html: Option<String>,
    /// The receive time in RFC 3339 format.
    pub date: Option<String>,
    /// Receive time in milliseconds since the Unix epoch, used for ordering.
    #[oai(skip)]
    #[serde(skip)]
    pub received_at_ms: Option<i64>,
}

/// Sorts descending by receive time; messages without a timestamp sort last.
pub fn sort_latest_first(emails: &mut [Email]) {
    emails.sort_by(|a, b| match (a.received_at_ms, b.received_at_ms) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

pub fn rfc3339_from_millis(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub fn millis_from_rfc3339(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::{millis_from_rfc3339, rfc3339_from_millis, sort_latest_first, Email};

    fn email(received_at_ms: Option<i64>) -> Email {
        Email {
            send: String::new(),
            subject: None,
            text: None,
            html: None,
            date: received_at_ms.and_then(rfc3339_from_millis),
            received_at_ms,
        }
    }

    #[test]
    fn test_sort_latest_first() {
        let mut emails = vec![
            email(Some(1_000)),
            email(None),
            email(Some(3_000)),
            email(Some(2_000)),
        ];
        sort_latest_first(&mut emails);
        let keys: Vec<_> = emails.iter().map(|e| e.received_at_ms).collect();
        assert_eq!(keys, vec![Some(3_000), Some(2_000), Some(1_000), None]);
    }

    #[test]
    fn test_sorted_output_is_monotonic() {
        let mut emails: Vec<Email> = (0..20).map(|i| email(Some(i * 37 % 11))).collect();
        sort_latest_first(&mut emails);
        for pair in emails.windows(2) {
            assert!(pair[0].received_at_ms >= pair[1].received_at_ms);
        }
    }

    #[test]
    fn test_timestamp_round_trip() {
        let formatted = rfc3339_from_millis(1_700_000_000_000).unwrap();
        assert_eq!(millis_from_rfc3339(&formatted), Some(1_700_000_000_000));
        assert!(millis_from_rfc3339("not-a-date").is_none());
    }
}
