use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response with status {status} has no usable Location header")]
    MissingLocation { status: u16 },
    #[error("unexpected response status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("protocol violation: {0}")]
    Protocol(String),
}
