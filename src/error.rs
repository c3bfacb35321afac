/// Required settings are absent or unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("EMAIL_PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),
}

/// The request body does not carry the required fields.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Both recipientEmail and emailTopic are required.")]
    MissingFields,

    #[error("Invalid request body: {0}")]
    Body(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// Always holds an error with its URL removed.
    #[error("Gemini request failed: {0}")]
    Request(reqwest::Error),

    #[error("Gemini returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Gemini returned an invalid response. Raw output: {raw}")]
    InvalidResponse { raw: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid email address format: {0}")]
    AddressFormat(#[from] lettre::address::AddressError),

    #[error("Failed to build email message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    SmtpTransport(#[from] lettre::transport::smtp::Error),
}

/// Any failure along the draft-and-send pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
