// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use mail::MailApi;
use poem_openapi::{OpenApiService, Tags};

use crate::mailpeek_version;

pub mod mail;

#[derive(Tags)]
pub enum ApiTags {
    Mail,
}

pub fn create_openapi_service() -> OpenApiService<MailApi, ()> {
    OpenApiService::new(MailApi, "MailPeekApi", mailpeek_version!())
}
