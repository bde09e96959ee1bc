// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser};
use std::{collections::HashSet, path::PathBuf, sync::LazyLock};
use url::Url;

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "mailpeek",
    about = "A small self-hosted service that returns the latest messages of a Microsoft mailbox,
    preferring the Graph REST listing and falling back to IMAP XOAUTH2 when Graph access is not granted.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// mailpeek log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for mailpeek"
    )]
    pub mailpeek_log_level: String,

    /// mailpeek HTTP port (default: 15730)
    #[clap(
        long,
        default_value = "15730",
        env,
        help = "Set the HTTP port for mailpeek"
    )]
    pub mailpeek_http_port: i32,

    /// The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).
    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub mailpeek_bind_ip: Option<String>,

    /// CORS allowed origins (default: "*")
    #[clap(
        long,
        default_value = "*",
        env,
        help = "Set the allowed CORS origins (comma-separated list, e.g., \"https://example.com, https://another.com\")",
        value_parser = ValueParser::new(|s: &str| -> Result<HashSet<String>, String> {
            let set: HashSet<String> = s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
            Ok(set)
        })
    )]
    pub mailpeek_cors_origins: HashSet<String>,

    /// CORS max age in seconds (default: 86400)
    #[clap(
        long,
        default_value = "86400",
        env,
        help = "Set the CORS max age in seconds"
    )]
    pub mailpeek_cors_max_age: i32,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub mailpeek_ansi_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub mailpeek_log_to_file: bool,

    /// Maximum number of log files (default: 5)
    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub mailpeek_max_server_log_files: usize,

    #[clap(
        long,
        env,
        help = "Set the directory for server log files (must exist and have write permissions)",
        value_parser = ValueParser::new(parse_log_dir)
    )]
    pub mailpeek_log_dir: Option<PathBuf>,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Enable compression for the open api server"
    )]
    pub mailpeek_http_compression_enabled: bool,

    /// Operator password required on retrieval requests.
    ///
    /// When unset, the password gate is disabled and requests are accepted
    /// without a `password` parameter.
    #[clap(
        long,
        env,
        help = "Set the operator password required by retrieval requests (gate disabled when unset)"
    )]
    pub mailpeek_operator_password: Option<String>,

    /// OAuth2 token endpoint used for the refresh-token grant.
    #[clap(
        long,
        default_value = "https://login.microsoftonline.com/consumers/oauth2/v2.0/token",
        env,
        help = "Set the OAuth2 token endpoint used for the refresh-token grant",
        value_parser = ValueParser::new(|s: &str| -> Result<String, String> {
            Url::parse(s).map_err(|_| format!("Invalid URL for the token endpoint: {}", s))?;
            Ok(s.to_string())
        })
    )]
    pub mailpeek_token_endpoint: String,

    /// IMAP host used by the legacy retrieval path (default: "outlook.office365.com")
    #[clap(
        long,
        default_value = "outlook.office365.com",
        env,
        help = "Set the IMAP host used by the legacy retrieval path"
    )]
    pub mailpeek_imap_host: String,

    /// IMAP port used by the legacy retrieval path (default: 993)
    #[clap(
        long,
        default_value = "993",
        env,
        help = "Set the IMAP port used by the legacy retrieval path"
    )]
    pub mailpeek_imap_port: u16,
}

fn parse_log_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.exists() {
        return Err(format!("Log directory does not exist: {:?}", path));
    }
    if !path.is_dir() {
        return Err(format!("Log path is not a directory: {:?}", path));
    }
    // Check write permission by attempting to create a temporary file
    let temp_file = path.join(".mailpeek_test_write");
    if std::fs::write(&temp_file, "").is_err() {
        return Err(format!("Log directory lacks write permission: {:?}", path));
    }
    let _ = std::fs::remove_file(&temp_file);
    Ok(path)
}

impl Settings {
    #[cfg(test)]
    fn new_for_test() -> Self {
        Self {
            mailpeek_log_level: "info".to_string(),
            mailpeek_http_port: 15730,
            mailpeek_bind_ip: Default::default(),
            mailpeek_cors_origins: Default::default(),
            mailpeek_cors_max_age: 86400,
            mailpeek_ansi_logs: false,
            mailpeek_log_to_file: false,
            mailpeek_max_server_log_files: 5,
            mailpeek_log_dir: None,
            mailpeek_http_compression_enabled: true,
            mailpeek_operator_password: Some("test-operator-password".into()),
            mailpeek_token_endpoint:
                "https://login.microsoftonline.com/consumers/oauth2/v2.0/token".into(),
            mailpeek_imap_host: "outlook.office365.com".into(),
            mailpeek_imap_port: 993,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_log_dir;

    #[test]
    fn test_parse_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = parse_log_dir(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(parsed, dir.path());

        let missing = dir.path().join("missing");
        assert!(parse_log_dir(missing.to_str().unwrap()).is_err());
    }
}
