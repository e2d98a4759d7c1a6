use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("invalid peer name {0:?}")]
    InvalidPeerName(String),
}

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("expected 32 key bytes, got {0}")]
    Length(usize),
}
