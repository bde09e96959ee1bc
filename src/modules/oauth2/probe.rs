use crate::modules::error::MailPeekResult;
use crate::modules::oauth2::exchange::exchange_refresh_token;

pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const MAIL_READ_WRITE_SCOPE: &str = "https://graph.microsoft.com/Mail.ReadWrite";

/// Outcome of the mail-scope exchange: the access token plus whether the
/// granted scope authorizes the Graph mail listing.
#[derive(Debug, Clone)]
pub struct ScopeProbe {
    pub access_token: String,
    pub graph_authorized: bool,
}

/// Performs the refresh-token grant requesting the Graph default scope and
/// inspects the granted scope string. The granted scope is the only reliable
/// signal for whether the Graph path is usable for this account.
pub async fn probe_graph_scope(
    refresh_token: &str,
    client_id: &str,
) -> MailPeekResult<ScopeProbe> {
    let grant =
        exchange_refresh_token(refresh_token, client_id, Some(GRAPH_DEFAULT_SCOPE)).await?;
    let graph_authorized = grant
        .scope
        .as_deref()
        .is_some_and(scope_grants_mail_access);
    Ok(ScopeProbe {
        access_token: grant.access_token,
        graph_authorized,
    })
}

fn scope_grants_mail_access(scope: &str) -> bool {
    scope
        .split_whitespace()
        .any(|granted| granted == MAIL_READ_WRITE_SCOPE)
}

#[cfg(test)]
mod tests {
    use super::scope_grants_mail_access;

    #[test]
    fn test_scope_membership() {
        assert!(scope_grants_mail_access(
            "openid https://graph.microsoft.com/Mail.ReadWrite offline_access"
        ));
        assert!(!scope_grants_mail_access("openid offline_access"));
        assert!(!scope_grants_mail_access(""));
    }

    #[test]
    fn test_scope_membership_is_token_exact() {
        // A broader grant naming a different permission must not be mistaken
        // for the mail read/write scope.
        assert!(!scope_grants_mail_access(
            "https://graph.microsoft.com/Mail.ReadWrite.Shared"
        ));
    }
}
