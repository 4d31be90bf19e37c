// ABOUTME: Error types with structured exit codes for CLI
// ABOUTME: Maps config, auth, feed and filesystem failures to exit codes

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Malformed entry: {0}")]
    Entry(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Auth(_) => 3,
            Error::Network(_) => 4,
            Error::Api { .. } => 5,
            Error::Xml(_) => 6,
            Error::Entry(_) => 7,
            Error::Filesystem(_) => 8,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
