//! GlStatus Core Library
//!
//! Resolves GitLab project paths from git remote URLs and posts commit
//! build statuses through the GitLab REST API.

pub mod error;
pub mod gitlab;
pub mod remote;
pub mod status;

pub use error::{Result, StatusError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
