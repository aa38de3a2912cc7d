use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend no longer accepts the session token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("PIN must have between 4 and 6 digits")]
    InvalidPin,
}
