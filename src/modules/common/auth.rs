// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::{
    modules::{
        error::{code::ErrorCode, MailPeekResult},
        settings::cli::SETTINGS,
    },
    raise_error,
};

/// Checks a caller-supplied password against the configured operator secret.
///
/// The gate is disabled when no secret is configured.
pub fn enforce_operator_password(provided: Option<&str>) -> MailPeekResult<()> {
    let Some(expected) = SETTINGS.mailpeek_operator_password.as_deref() else {
        return Ok(());
    };
    match provided {
        Some(password) if password == expected => Ok(()),
        _ => Err(raise_error!(
            "Authentication failed. Please provide valid credentials or contact administrator for access."
                .into(),
            ErrorCode::PermissionDenied
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::enforce_operator_password;
    use crate::modules::error::code::ErrorCode;
    use crate::modules::error::MailPeekError;

    #[test]
    fn test_matching_password_is_accepted() {
        assert!(enforce_operator_password(Some("test-operator-password")).is_ok());
    }

    #[test]
    fn test_missing_or_wrong_password_is_rejected() {
        for provided in [None, Some("wrong")] {
            let MailPeekError::Generic { code, .. } =
                enforce_operator_password(provided).unwrap_err();
            assert_eq!(code, ErrorCode::PermissionDenied);
        }
    }
}
