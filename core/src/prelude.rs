/// Failures raised by the AI gateway operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("API key missing")]
    MissingCredential,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("service returned no text")]
    EmptyResponse,
    #[error("failed to extract data from ID: {0}")]
    ExtractionFailed(String),
}

impl GatewayError {
    /// True when the call never left the process.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, GatewayError::MissingCredential)
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Rejections from the registration form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Name and ID are required")]
    MissingRequiredFields,
    #[error("an ID scan is already in progress")]
    ExtractionInProgress,
}
