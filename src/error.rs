use thiserror::Error;

#[derive(Error, Debug)]
pub enum EsgError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error - something went wrong when requesting [CODE: {status}]: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid calculator request: {0}")]
    InvalidRequest(String),

    #[error("Unknown risk profile: {0}")]
    UnknownProfile(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EsgError>;
