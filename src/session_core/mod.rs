//! Core session, authentication and request plumbing for the platform API.

pub mod auth;
pub mod http_client;
pub mod location;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod types;
