pub mod client;
pub mod fetch;
pub mod oauth2;
pub mod session;
