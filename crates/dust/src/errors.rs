use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Required configuration is missing; raised before any request is made
    #[error("{0}")]
    Configuration(String),

    /// The service answered with a non-success status
    #[error("{context}: {status}")]
    Status { context: String, status: u16 },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered, but not with a body shape we understand
    #[error("Unexpected response: {0}")]
    ProtocolMismatch(String),
}

impl ProviderError {
    pub fn status<S: Into<String>>(context: S, status: reqwest::StatusCode) -> Self {
        ProviderError::Status {
            context: context.into(),
            status: status.as_u16(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
