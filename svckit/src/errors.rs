use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClinicError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Parse error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for ClinicError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClinicError::Decode(err.to_string())
        } else {
            ClinicError::Network(err.to_string())
        }
    }
}
