use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// A field required by the chosen topology was not supplied
    #[error("{field} is required for the {topology} topology")]
    MissingField { topology: &'static str, field: &'static str },

    /// Configuration is present but unusable
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Two resources were registered under the same logical name
    #[error("Resource {name} is already defined")]
    DuplicateResource { name: String },

    /// A resource refers to something that has not been emitted yet
    #[error("Resource {resource} references unknown resource {reference}")]
    UnknownReference { resource: String, reference: String },

    /// Stack document could not be rendered
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error was caused by what the caller supplied, as opposed to a bug in
    /// graph construction or an environment failure
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::MissingField { .. } | Error::InvalidConfig { .. })
    }
}

/// Type alias for module operation results
pub type Result<T> = std::result::Result<T, Error>;
