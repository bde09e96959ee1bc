use crate::utc_now;
use chrono::Local;
use poem::{handler, web::Json, IntoResponse};
use poem_openapi::Object;
use serde::Deserialize;
use serde::Serialize;
use std::sync::LazyLock;

pub static STARTED_AT: LazyLock<i64> = LazyLock::new(|| utc_now!());

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Object)]
pub struct MailPeekStatus {
    /// The service uptime in milliseconds since it started.
    pub uptime_ms: i64,
    /// The timezone in which the service is operating (e.g., "+00:00").
    pub timezone: String,
    /// The version of the MailPeek service currently running.
    pub version: String,
}

impl MailPeekStatus {
    pub fn get() -> Self {
        Self {
            uptime_ms: utc_now!() - *STARTED_AT,
            timezone: Local::now().offset().to_string(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

#[handler]
pub async fn get_status() -> impl IntoResponse {
    Json(MailPeekStatus::get())
}
