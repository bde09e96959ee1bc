// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod common;
pub mod error;
pub mod graph;
pub mod imap;
pub mod logger;
pub mod message;
pub mod oauth2;
pub mod rest;
pub mod settings;
pub mod utils;
