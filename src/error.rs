use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashError {
    /// The launch dataset could not be read, parsed or validated.
    #[error("Failed to load launch data: {0}")]
    DataLoad(String),

    /// A site selection that names no site in the dataset.
    #[error("Site '{0}' is not present in the launch data")]
    InvalidSelection(String),

    #[error("Invalid payload range [{low}, {high}]: expected 0 <= low <= high <= 10000")]
    InvalidRange { low: u32, high: u32 },

    /// A dashboard input body that is not a known control or carries a malformed value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown or expired session: {0}")]
    UnknownSession(String),
}

pub type Result<T> = std::result::Result<T, DashError>;
