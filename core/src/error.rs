use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Summary credentials missing: no API key configured")]
    CredentialMissing,

    #[error("Summary transport failure: {0}")]
    Transport(String),

    #[error("Malformed summary response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
