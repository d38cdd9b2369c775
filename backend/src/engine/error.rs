/// Failures that abort a validation call. Rule breaches are not errors;
/// they are reported as violations in the result.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed or incomplete input.
    #[error("invalid input: {0}")]
    Input(String),

    /// A shift points at a user or position the caller did not supply.
    #[error("unknown reference: {0}")]
    Reference(String),

    /// Supplied data breaks an invariant the engine relies on.
    #[error("computation error: {0}")]
    Computation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
