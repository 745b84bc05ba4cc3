use thiserror::Error;

/// Local validation failures. These block submission and are never sent to the backend.
///
/// The `Display` text of the file variants is exactly what the file-info line shows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File too large (max 16MB)")]
    TooLarge { byte_size: u64, max_bytes: u64 },

    #[error("Invalid file type (PDF, JPG, PNG only)")]
    InvalidType { extension: String },

    #[error("No utility bill selected")]
    MissingFile,

    #[error("Point of Delivery ID is required for {provider}")]
    MissingPoid { provider: String },

    #[error("POA agreement must be accepted")]
    PoaNotAccepted,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Client-level error type covering every way an intake submission can end badly.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Submission error (status {status}): {message}")]
    Submission { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Processing error at {step}: {message}")]
    Processing { step: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Form has already been submitted")]
    AlreadySubmitted,
}

impl IntakeError {
    /// True for errors the user can only recover from by reloading and retrying.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IntakeError::Validation(_))
    }
}
