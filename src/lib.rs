// ABOUTME: Public library API for Hatena Blog export
// ABOUTME: Re-exports core modules for the CLI and integration tests

pub mod api;
pub mod authorize;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod extract;
pub mod feed;
pub mod media;
pub mod model;
pub mod oauth;
pub mod storage;
pub mod util;

pub use error::{Error, Result};
pub use model::{Entry, ExportedFrontmatter, RawEntry};
