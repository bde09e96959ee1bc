use mimalloc::MiMalloc;
use modules::{
    common::rustls::MailPeekTls, error::MailPeekResult, logger, rest::start_http_server,
};
use tracing::info;

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
  __  __       _ _ ____           _
 |  \/  | __ _(_) |  _ \ ___  ___| | __
 | |\/| |/ _` | | | |_) / _ \/ _ \ |/ /
 | |  | | (_| | | |  __/  __/  __/   <
 |_|  |_|\__,_|_|_|_|   \___|\___|_|\_\

"#;

#[tokio::main]
async fn main() -> MailPeekResult<()> {
    logger::initialize_logging();
    info!("{}", LOGO);
    info!("Starting mailpeek-server");
    info!("Version:  {}", mailpeek_version!());
    info!("Git:      [{}]", env!("GIT_HASH"));

    if let Err(error) = initialize() {
        eprintln!("{:?}", error);
        return Err(error);
    }

    start_http_server().await
}

fn initialize() -> MailPeekResult<()> {
    MailPeekTls::initialize()?;
    std::sync::LazyLock::force(&modules::rest::public::status::STARTED_AT);
    Ok(())
}
