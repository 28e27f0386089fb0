use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Two candidates in one batch share a stable id.
    #[error("duplicate stable id '{stable_id}' in candidate batch")]
    DuplicateStableId { stable_id: String },
    /// A candidate arrived without a stable id.
    #[error("candidate at position {position} has an empty stable id")]
    EmptyStableId { position: usize },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty name, clashing columns, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Missing required column in input data.
    #[error("missing column '{column}'")]
    MissingColumn { column: String },
    #[error("CSV error: {0}")]
    Csv(String),
    /// IO error (file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
    /// A restored snapshot breaks the keyed-by-stable-id shape.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    /// A previous holder of the snapshot lock panicked.
    #[error("snapshot lock poisoned")]
    SnapshotPoisoned,
}

/// Failure reported by a [`crate::register::Registrar`] for a single record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("registration failed: {0}")]
pub struct RegistrationError(pub String);

impl RegistrationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
