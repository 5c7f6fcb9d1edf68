use thiserror::Error;

/// Errors raised by the patient and reference-table use cases
#[derive(Debug, Error)]
pub enum ClinicalError {
    /// A required field is missing, blank or out of bounds
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique-constraint collision (email, national id, patient number)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed identifier parameter (null or non-positive id)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Could not generate a unique patient number after {attempts} attempts")]
    NumberExhausted { attempts: u32 },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Report error: {0}")]
    Render(String),
}

impl ClinicalError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ClinicalError::Validation(_) => "validation",
            ClinicalError::NotFound(_) => "not-found",
            ClinicalError::Conflict(_) => "conflict",
            ClinicalError::InvalidArgument(_) => "invalid-argument",
            ClinicalError::NumberExhausted { .. } => "number-exhausted",
            ClinicalError::Store(_) => "store",
            ClinicalError::Render(_) => "render",
        }
    }

    /// Prefix the message with the use case it failed in, keeping the kind
    pub(crate) fn context(self, ctx: &str) -> Self {
        match self {
            ClinicalError::Validation(m) => ClinicalError::Validation(format!("{}: {}", ctx, m)),
            ClinicalError::NotFound(m) => ClinicalError::NotFound(format!("{}: {}", ctx, m)),
            ClinicalError::Conflict(m) => ClinicalError::Conflict(format!("{}: {}", ctx, m)),
            ClinicalError::InvalidArgument(m) => {
                ClinicalError::InvalidArgument(format!("{}: {}", ctx, m))
            }
            other => other,
        }
    }
}

/// Errors reported by a record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique or foreign-key constraint rejected the write
    #[error("constraint violation: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for ClinicalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ClinicalError::Conflict(msg),
            StoreError::Backend(msg) => ClinicalError::Store(msg),
        }
    }
}

/// Errors reported by a report renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("report engine unavailable: {0}")]
    Unavailable(String),

    #[error("report engine rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<RenderError> for ClinicalError {
    fn from(err: RenderError) -> Self {
        ClinicalError::Render(err.to_string())
    }
}

pub type ClinicalResult<T> = Result<T, ClinicalError>;
