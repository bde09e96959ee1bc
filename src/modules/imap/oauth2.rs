use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailPeekResult;
use crate::{base64_encode, raise_error};

/// SASL XOAUTH2 credential for the legacy mail path.
#[derive(Debug)]
pub struct XOAuth2 {
    user: String,
    access_token: String,
}

impl XOAuth2 {
    pub fn new(user: impl Into<String>, access_token: impl Into<String>) -> MailPeekResult<Self> {
        let user = user.into();
        let access_token = access_token.into();
        if user.is_empty() || access_token.is_empty() {
            return Err(raise_error!(
                "XOAUTH2 requires both a mailbox identity and an access token".into(),
                ErrorCode::InvalidParameter
            ));
        }
        Ok(Self { user, access_token })
    }

    pub fn payload(&self) -> String {
        format!(
            "user={}\x01auth=Bearer {}\x01\x01",
            self.user, self.access_token
        )
    }

    /// The base64 form of the credential as carried on the wire.
    pub fn encoded(&self) -> String {
        base64_encode!(self.payload())
    }
}

impl async_imap::Authenticator for XOAuth2 {
    type Response = String;

    fn process(&mut self, _data: &[u8]) -> Self::Response {
        self.payload()
    }
}

#[cfg(test)]
mod tests {
    use super::XOAuth2;
    use crate::base64_encode;

    #[test]
    fn test_encoded_credential() {
        let auth = XOAuth2::new("a@b.com", "T").unwrap();
        assert_eq!(auth.payload(), "user=a@b.com\x01auth=Bearer T\x01\x01");
        assert_eq!(
            auth.encoded(),
            base64_encode!("user=a@b.com\x01auth=Bearer T\x01\x01")
        );
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        assert!(XOAuth2::new("", "T").is_err());
        assert!(XOAuth2::new("a@b.com", "").is_err());
    }
}
