// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::MailPeekResult;
use crate::modules::graph::client::{fetch_latest_messages, graph_folder_id};
use crate::modules::imap::fetch::ImapMailReader;
use crate::modules::message::Email;
use crate::modules::oauth2::exchange::exchange_refresh_token;
use crate::modules::oauth2::probe::probe_graph_scope;
use crate::modules::settings::cli::SETTINGS;
use tracing::info;

pub const DEFAULT_LIMIT: usize = 10;

/// Caller-supplied account material, held only for the duration of one call.
#[derive(Debug, Clone)]
pub struct MailCredentials {
    pub refresh_token: String,
    pub client_id: String,
    /// Mailbox identity, used only by the IMAP path's XOAUTH2 credential.
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalPath {
    Graph,
    Imap,
}

impl RetrievalPath {
    /// The Graph listing is used exactly when the granted scope authorizes it.
    pub fn select(graph_authorized: bool) -> Self {
        if graph_authorized {
            RetrievalPath::Graph
        } else {
            RetrievalPath::Imap
        }
    }
}

/// Retrieves the newest `limit` messages of `mailbox`, routing through the
/// Graph listing when the granted OAuth2 scope allows it and through IMAP
/// XOAUTH2 otherwise. Both paths produce the same normalized shape, newest
/// first.
pub async fn retrieve_latest_emails(
    credentials: &MailCredentials,
    mailbox: &str,
    limit: usize,
) -> MailPeekResult<Vec<Email>> {
    let probe = probe_graph_scope(&credentials.refresh_token, &credentials.client_id).await?;
    match RetrievalPath::select(probe.graph_authorized) {
        RetrievalPath::Graph => {
            let folder_id = graph_folder_id(mailbox);
            info!("Graph mail scope granted, listing folder '{folder_id}'");
            Ok(fetch_latest_messages(&probe.access_token, folder_id, limit).await)
        }
        RetrievalPath::Imap => {
            info!("Graph mail scope not granted, falling back to IMAP");
            let grant =
                exchange_refresh_token(&credentials.refresh_token, &credentials.client_id, None)
                    .await?;
            let reader = ImapMailReader::new(
                SETTINGS.mailpeek_imap_host.clone(),
                SETTINGS.mailpeek_imap_port,
            );
            reader
                .retrieve_latest(&credentials.email, &grant.access_token, mailbox, limit)
                .await
        }
    }
}

/// Coerces a caller-supplied limit string; non-numeric or non-positive input
/// falls back to the default.
pub fn coerce_limit(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::{coerce_limit, RetrievalPath, DEFAULT_LIMIT};

    #[test]
    fn test_path_selection_is_exclusive() {
        assert_eq!(RetrievalPath::select(true), RetrievalPath::Graph);
        assert_eq!(RetrievalPath::select(false), RetrievalPath::Imap);
    }

    #[test]
    fn test_coerce_limit() {
        assert_eq!(coerce_limit(Some("5")), 5);
        assert_eq!(coerce_limit(Some(" 25 ")), 25);
        assert_eq!(coerce_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(coerce_limit(Some("0")), DEFAULT_LIMIT);
        assert_eq!(coerce_limit(Some("")), DEFAULT_LIMIT);
        assert_eq!(coerce_limit(None), DEFAULT_LIMIT);
    }
}
