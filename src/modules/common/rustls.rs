use crate::{
    modules::error::{code::ErrorCode, MailPeekResult},
    raise_error,
};

pub struct MailPeekTls;

impl MailPeekTls {
    pub fn initialize() -> MailPeekResult<()> {
        rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
            .map_err(|_| {
                raise_error!(
                    "failed to set crypto provider".into(),
                    ErrorCode::InternalError
                )
            })
    }
}
