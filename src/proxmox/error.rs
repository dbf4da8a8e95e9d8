use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxmoxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API request failed: {0} - {1}")]
    Api(StatusCode, String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ProxmoxError>;
